use chrono::Utc;

/// Source of the Unix timestamps that key individual ratings.
pub trait Clock: Send + Sync {
    fn unix_seconds(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Field name for the `attempt`-th rating written in the same second.
pub fn rating_field(seconds: i64, attempt: u32) -> String {
    match attempt {
        0 => seconds.to_string(),
        n => format!("{seconds}.{n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_field() {
        assert_eq!(rating_field(1_700_000_000, 0), "1700000000");
        assert_eq!(rating_field(1_700_000_000, 2), "1700000000.2");
    }

    #[test]
    fn test_system_clock_is_recent() {
        assert!(SystemClock.unix_seconds() > 1_600_000_000);
    }
}
