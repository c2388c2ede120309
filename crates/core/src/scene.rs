//! Landsat scene identity
//!
//! A scene identifier is a fixed-width, positional string such as
//! `LC82150672015015LGN00`: sensor code (3), path (3), row (3), year (4),
//! day of year (3), ground station + version (5). Everything the pipeline
//! knows about a scene before touching a raster is derived from it.

use crate::error::{Error, Result};
use chrono::{Datelike, Days, NaiveDate};

/// Expected identifier width
const SCENE_ID_LEN: usize = 21;

/// A parsed Landsat scene identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    sensor: String,
    path: u16,
    row: u16,
    year: i32,
    doy: u32,
    station: String,
}

impl Scene {
    /// Parse a fixed-width scene identifier.
    ///
    /// Malformed identifiers fail here, before any raster stage runs; the
    /// substring layout is positional so a short or non-numeric identifier
    /// must never be silently truncated.
    pub fn parse(id: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSceneId {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        if !id.is_ascii() {
            return Err(invalid("identifier must be ASCII"));
        }
        if id.len() != SCENE_ID_LEN {
            return Err(invalid(&format!(
                "expected {} characters, got {}",
                SCENE_ID_LEN,
                id.len()
            )));
        }

        let path: u16 = id[3..6]
            .parse()
            .map_err(|_| invalid("path is not numeric"))?;
        let row: u16 = id[6..9]
            .parse()
            .map_err(|_| invalid("row is not numeric"))?;
        let year: i32 = id[9..13]
            .parse()
            .map_err(|_| invalid("year is not numeric"))?;
        let doy: u32 = id[13..16]
            .parse()
            .map_err(|_| invalid("day of year is not numeric"))?;

        // Rejects doy 0, doy 366 in non-leap years, etc.
        if NaiveDate::from_yo_opt(year, doy).is_none() {
            return Err(invalid(&format!("day {} does not exist in {}", doy, year)));
        }

        Ok(Self {
            sensor: id[0..3].to_string(),
            path,
            row,
            year,
            doy,
            station: id[16..].to_string(),
        })
    }

    /// The canonical identifier string
    pub fn id(&self) -> String {
        format!(
            "{}{:03}{:03}{}{:03}{}",
            self.sensor, self.path, self.row, self.year, self.doy, self.station
        )
    }

    pub fn sensor(&self) -> &str {
        &self.sensor
    }

    pub fn path(&self) -> u16 {
        self.path
    }

    pub fn row(&self) -> u16 {
        self.row
    }

    /// Calendar date of acquisition
    pub fn acquisition_date(&self) -> NaiveDate {
        // Validated in parse()
        NaiveDate::from_yo_opt(self.year, self.doy)
            .expect("scene date was validated at parse time")
    }

    /// Stable display name, e.g. `LC8_215-067_20150115_LGN00`
    pub fn display_name(&self) -> String {
        format!(
            "{}_{:03}-{:03}_{}_{}",
            self.sensor,
            self.path,
            self.row,
            self.acquisition_date().format("%Y%m%d"),
            self.station
        )
    }

    /// The scene acquired `revisit_days` earlier over the same footprint.
    ///
    /// Path, row, sensor and station stay fixed; the year and day of year
    /// are recomputed from the shifted calendar date, rolling over year
    /// boundaries where needed.
    pub fn comparison(&self, revisit_days: u32) -> Scene {
        let date = self.acquisition_date() - Days::new(u64::from(revisit_days));
        let jan1 = NaiveDate::from_yo_opt(date.year(), 1).expect("January 1st always exists");
        let doy = (date - jan1).num_days() as u32 + 1;

        Scene {
            sensor: self.sensor.clone(),
            path: self.path,
            row: self.row,
            year: date.year(),
            doy,
            station: self.station.clone(),
        }
    }
}

impl std::fmt::Display for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let scene = Scene::parse("LC82150672015015LGN00").unwrap();
        assert_eq!(scene.sensor(), "LC8");
        assert_eq!(scene.path(), 215);
        assert_eq!(scene.row(), 67);
        assert_eq!(
            scene.acquisition_date(),
            NaiveDate::from_ymd_opt(2015, 1, 15).unwrap()
        );
        assert_eq!(scene.id(), "LC82150672015015LGN00");
    }

    #[test]
    fn test_display_name() {
        let scene = Scene::parse("LC82150672015015LGN00").unwrap();
        assert_eq!(scene.display_name(), "LC8_215-067_20150115_LGN00");
    }

    #[test]
    fn test_parse_rejects_short_id() {
        assert!(matches!(
            Scene::parse("LC8215067"),
            Err(Error::InvalidSceneId { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_numeric_date() {
        assert!(Scene::parse("LC8215067XXXX015LGN00").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_doy() {
        // 2015 is not a leap year
        assert!(Scene::parse("LC82150672015366LGN00").is_err());
        assert!(Scene::parse("LC82150672015000LGN00").is_err());
        // 2016 is
        assert!(Scene::parse("LC82150672016366LGN00").is_ok());
    }

    #[test]
    fn test_comparison_same_year() {
        let scene = Scene::parse("LC82150672015100LGN00").unwrap();
        let prev = scene.comparison(16);
        assert_eq!(prev.id(), "LC82150672015084LGN00");
    }

    #[test]
    fn test_comparison_crosses_year_boundary() {
        // Day 15 of 2015 minus 16 days lands on 2014-12-30, day 364
        let scene = Scene::parse("LC82150672015015LGN00").unwrap();
        let prev = scene.comparison(16);
        assert_eq!(
            prev.acquisition_date(),
            NaiveDate::from_ymd_opt(2014, 12, 30).unwrap()
        );
        assert_eq!(prev.id(), "LC82150672014364LGN00");
    }

    #[test]
    fn test_comparison_crosses_leap_year_boundary() {
        // Day 10 of 2017 minus 16 days: 2016 is a leap year, so the
        // previous scene is day 360 of 366
        let scene = Scene::parse("LC82150672017010LGN00").unwrap();
        let prev = scene.comparison(16);
        assert_eq!(prev.id(), "LC82150672016360LGN00");
    }
}
