//! Offline geolocation from a MaxMind GeoLite2/GeoIP2 City database.

use std::net::IpAddr;
use std::path::Path;

use maxminddb::{MaxMindDBError, Reader, geoip2};
use tracing::debug;

use crate::domain::classifiers::{GeoLocation, GeoLocator};

/// [`GeoLocator`] over a memory-loaded `.mmdb` file.
pub struct MaxMindLocator {
    reader: Reader<Vec<u8>>,
}

impl MaxMindLocator {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MaxMindDBError> {
        Ok(Self {
            reader: Reader::open_readfile(path)?,
        })
    }
}

impl GeoLocator for MaxMindLocator {
    fn locate(&self, ip: &str) -> Option<GeoLocation> {
        let addr: IpAddr = ip.parse().ok()?;

        let city: geoip2::City = match self.reader.lookup(addr) {
            Ok(city) => city,
            Err(e) => {
                debug!(ip, "GeoIP lookup failed: {}", e);
                return None;
            }
        };

        let country_code = city
            .country
            .as_ref()
            .and_then(|c| c.iso_code)
            .unwrap_or_default()
            .to_string();

        let city_name = city
            .city
            .as_ref()
            .and_then(|c| c.names.as_ref())
            .and_then(|names| names.get("en").map(|s| s.to_string()))
            .unwrap_or_default();

        Some(GeoLocation {
            country_code,
            city: city_name,
        })
    }
}
