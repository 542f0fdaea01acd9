use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

const PHASE_SECONDS: RangeInclusive<u64> = 1..=24 * 60 * 60;
const CLEANUP_SECONDS: RangeInclusive<u64> = 1..=7 * 24 * 60 * 60;
const MAX_PLAYERS: RangeInclusive<usize> = 1..=100;
const COMMENT_LENGTH: RangeInclusive<usize> = 1..=10_000;
const COMMENTS_KEPT: RangeInclusive<usize> = 1..=100_000;

#[derive(Debug, Clone)]
pub struct GameConfig {
    // 各フェーズ（昼/夜）の長さ
    pub phase_duration_seconds: u64,
    pub default_max_players: usize,
    // 終了/キャンセル済みゲームを掃除する間隔
    pub cleanup_interval_seconds: u64,
    pub max_comment_length: usize,
    pub max_comments: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            phase_duration_seconds: 60,
            default_max_players: 10,
            cleanup_interval_seconds: 5 * 60,
            max_comment_length: 500,
            max_comments: 1000,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            phase_duration_seconds: env_in(
                "PHASE_DURATION_SECONDS",
                PHASE_SECONDS,
                defaults.phase_duration_seconds,
            ),
            default_max_players: env_in("DEFAULT_MAX_PLAYERS", MAX_PLAYERS, defaults.default_max_players),
            cleanup_interval_seconds: env_in(
                "CLEANUP_INTERVAL_SECONDS",
                CLEANUP_SECONDS,
                defaults.cleanup_interval_seconds,
            ),
            max_comment_length: env_in("MAX_COMMENT_LENGTH", COMMENT_LENGTH, defaults.max_comment_length),
            max_comments: env_in("MAX_COMMENTS", COMMENTS_KEPT, defaults.max_comments),
        }
    }

    // 直接組み立てられた値も範囲内に収める
    pub fn phase_duration(&self) -> Duration {
        Duration::from_secs(clamp_to(self.phase_duration_seconds, &PHASE_SECONDS))
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(clamp_to(self.cleanup_interval_seconds, &CLEANUP_SECONDS))
    }
}

fn clamp_to<T: Ord + Copy>(value: T, range: &RangeInclusive<T>) -> T {
    value.clamp(*range.start(), *range.end())
}

fn env_in<T>(name: &str, range: RangeInclusive<T>, default: T) -> T
where
    T: FromStr + PartialOrd + Display + Copy,
{
    let Ok(raw) = env::var(name) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if range.contains(&value) => value,
        _ => {
            log::warn!(
                "{}={} is not a number in {}..={}; using {}",
                name,
                raw,
                range.start(),
                range.end(),
                default
            );
            default
        }
    }
}
