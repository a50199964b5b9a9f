//! Configuration validation.
//!
//! Rejects values the scheduler cannot work with. Missing fields are always
//! fine; they fall back to defaults in the [`Config`] accessors.

use anyhow::Result;

use super::Config;
use crate::common::constants::*;

pub fn validate_config(config: &Config) -> Result<()> {
    match (config.latitude, config.longitude) {
        (Some(_), None) => anyhow::bail!("latitude is set but longitude is missing"),
        (None, Some(_)) => anyhow::bail!("longitude is set but latitude is missing"),
        _ => {}
    }

    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {lat})");
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!("longitude must be between -180 and 180 degrees (got {lon})");
    }

    if let Some(size) = config.info_size
        && !(MINIMUM_INFO_SIZE..=MAXIMUM_INFO_SIZE).contains(&size)
    {
        anyhow::bail!(
            "info_size ({size}) must be between {MINIMUM_INFO_SIZE} and {MAXIMUM_INFO_SIZE}"
        );
    }

    if let Some(interval) = config.update_interval
        && !(MINIMUM_UPDATE_INTERVAL..=MAXIMUM_UPDATE_INTERVAL).contains(&interval)
    {
        anyhow::bail!(
            "update_interval ({interval} min) must be between {MINIMUM_UPDATE_INTERVAL} and {MAXIMUM_UPDATE_INTERVAL} minutes"
        );
    }

    if let Some(debounce) = config.debounce
        && debounce > MAXIMUM_DEBOUNCE
    {
        anyhow::bail!("debounce ({debounce} ms) must be at most {MAXIMUM_DEBOUNCE} milliseconds");
    }

    if let Some(fade) = config.fade_duration
        && fade > MAXIMUM_FADE_DURATION
    {
        anyhow::bail!("fade_duration ({fade} s) must be at most {MAXIMUM_FADE_DURATION} seconds");
    }

    if let Some(ext) = config.image_extension.as_deref()
        && ext.contains(['/', '\\'])
    {
        anyhow::bail!("image_extension must be a plain file extension (got \"{ext}\")");
    }

    Ok(())
}
