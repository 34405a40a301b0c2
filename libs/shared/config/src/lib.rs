use std::env;
use std::str::FromStr;

use chrono::{Duration, FixedOffset, Offset, Utc};
use tracing::warn;

const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;

/// Where appointments, customers and the catalog are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Supabase,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" | "in-memory" => Ok(StorageBackend::Memory),
            "supabase" | "postgrest" => Ok(StorageBackend::Supabase),
            other => Err(format!("Unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub storage_backend: StorageBackend,
    pub catalog_path: Option<String>,
    pub bind_address: String,
    pub booking_session_ttl_minutes: i64,
    /// Offset of the salon's wall clock; decides what "today" is.
    pub utc_offset: FixedOffset,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            storage_backend: env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|value| match value.parse() {
                    Ok(backend) => Some(backend),
                    Err(e) => {
                        warn!("{}, falling back to in-memory storage", e);
                        None
                    }
                })
                .unwrap_or(StorageBackend::Memory),
            catalog_path: env::var("CATALOG_PATH").ok(),
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            booking_session_ttl_minutes: parse_session_ttl(env::var("BOOKING_SESSION_TTL_MINUTES").ok()),
            utc_offset: parse_utc_offset(env::var("BUSINESS_UTC_OFFSET").ok()),
        };

        if config.storage_backend == StorageBackend::Supabase && !config.is_configured() {
            warn!("Supabase storage selected but not fully configured - missing environment variables");
        }

        if config.storage_backend == StorageBackend::Memory && config.catalog_path.is_none() {
            warn!("CATALOG_PATH not set, starting with an empty service catalog");
        }

        config
    }

    /// Idle lifetime of a booking session. Falls back to the default when the
    /// configured minutes do not fit a `Duration`.
    pub fn booking_session_ttl(&self) -> Duration {
        Duration::try_minutes(self.booking_session_ttl_minutes).unwrap_or_else(|| {
            warn!("Booking session TTL of {} minutes is out of range, using {}",
                  self.booking_session_ttl_minutes, DEFAULT_SESSION_TTL_MINUTES);
            Duration::minutes(DEFAULT_SESSION_TTL_MINUTES)
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }
}

fn parse_session_ttl(value: Option<String>) -> i64 {
    let Some(raw) = value else {
        return DEFAULT_SESSION_TTL_MINUTES;
    };

    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|minutes| *minutes > 0 && Duration::try_minutes(*minutes).is_some())
        .unwrap_or_else(|| {
            warn!("BOOKING_SESSION_TTL_MINUTES={} is not a usable number of minutes, using {}",
                  raw, DEFAULT_SESSION_TTL_MINUTES);
            DEFAULT_SESSION_TTL_MINUTES
        })
}

fn parse_utc_offset(value: Option<String>) -> FixedOffset {
    let Some(raw) = value else {
        warn!("BUSINESS_UTC_OFFSET not set, reading dates in UTC");
        return Utc.fix();
    };

    raw.trim().parse::<FixedOffset>().unwrap_or_else(|e| {
        warn!("BUSINESS_UTC_OFFSET={} is not an offset like -03:00 ({}), reading dates in UTC", raw, e);
        Utc.fix()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_storage_backend_names() {
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert_eq!("Supabase".parse::<StorageBackend>(), Ok(StorageBackend::Supabase));
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn session_ttl_rejects_values_out_of_range() {
        assert_eq!(parse_session_ttl(None), 30);
        assert_eq!(parse_session_ttl(Some("45".to_string())), 45);
        assert_eq!(parse_session_ttl(Some("0".to_string())), 30);
        assert_eq!(parse_session_ttl(Some("soon".to_string())), 30);
        assert_eq!(parse_session_ttl(Some(i64::MAX.to_string())), 30);
    }

    #[test]
    fn oversized_ttl_field_falls_back_to_default_duration() {
        let config = AppConfig {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: String::new(),
            storage_backend: StorageBackend::Memory,
            catalog_path: None,
            bind_address: "127.0.0.1:0".to_string(),
            booking_session_ttl_minutes: i64::MAX,
            utc_offset: Utc.fix(),
        };
        assert_eq!(config.booking_session_ttl(), Duration::minutes(30));
    }

    #[test]
    fn parses_business_offsets() {
        assert_eq!(parse_utc_offset(Some("-03:00".to_string())), FixedOffset::west_opt(3 * 3600).unwrap());
        assert_eq!(parse_utc_offset(Some("+05:30".to_string())), FixedOffset::east_opt(5 * 3600 + 1800).unwrap());
        assert_eq!(parse_utc_offset(Some("somewhere".to_string())), Utc.fix());
        assert_eq!(parse_utc_offset(None), Utc.fix());
    }
}
