//! Magnetic declination resolution.
//!
//! The resolver tries external providers in order and falls back to the
//! deterministic offline model; it always produces a numeric value for
//! finite input and never raises. Plausibility judgment stays with the
//! caller via [`is_plausible`].

pub mod http;
pub mod offline;

pub use http::HttpProvider;
pub use offline::{declination_at, default_for_zone, plausible_range, MODEL_EPOCH};

use async_trait::async_trait;
use chrono::Datelike;
use std::collections::HashMap;
use std::sync::Mutex;

/// An external declination source. Providers answer `None` when unavailable;
/// they never block the pipeline.
#[async_trait]
pub trait DeclinationProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn declination(&self, lon: f64, lat: f64, decimal_year: f64) -> Option<f64>;
}

/// Decimal year (year + month fraction) for drift correction.
pub fn decimal_year_now() -> f64 {
    let now = chrono::Utc::now();
    now.year() as f64 + now.month0() as f64 / 12.0
}

/// Ordered-provider declination resolver with an offline fallback and a
/// position-keyed cache (0.01° cells).
pub struct DeclinationResolver {
    providers: Vec<Box<dyn DeclinationProvider>>,
    cache: Mutex<HashMap<(i64, i64), f64>>,
}

impl Default for DeclinationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclinationResolver {
    /// Offline-only resolver.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_providers(providers: Vec<Box<dyn DeclinationProvider>>) -> Self {
        Self {
            providers,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn push_provider(&mut self, provider: Box<dyn DeclinationProvider>) {
        self.providers.push(provider);
    }

    /// Resolve declination for the current date. Never fails; see
    /// [`Self::resolve_at`].
    pub async fn resolve(&self, lon: f64, lat: f64) -> f64 {
        self.resolve_at(lon, lat, decimal_year_now()).await
    }

    /// Resolve declination at a fixed decimal year.
    ///
    /// The returned future is safe to drop when newer input supersedes it (a
    /// stale in-flight lookup simply never lands); debouncing is the
    /// caller's concern.
    pub async fn resolve_at(&self, lon: f64, lat: f64, decimal_year: f64) -> f64 {
        if !lon.is_finite() || !lat.is_finite() {
            tracing::warn!("non-finite position ({}, {}), declination defaults to 0", lon, lat);
            return 0.0;
        }

        let key = cache_key(lon, lat);
        if let Ok(cache) = self.cache.lock() {
            if let Some(value) = cache.get(&key) {
                return *value;
            }
        }

        let mut value = None;
        for provider in &self.providers {
            if let Some(d) = provider.declination(lon, lat, decimal_year).await {
                tracing::debug!(provider = %provider.name(), declination = d, "declination resolved");
                value = Some(d);
                break;
            }
            tracing::debug!(provider = %provider.name(), "declination provider unavailable");
        }
        let value = value.unwrap_or_else(|| offline::declination_at(lon, lat, decimal_year));

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, value);
        }
        value
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

/// Whether a declination value is plausible for a position; implausible
/// values are a signal to the caller, not an error.
pub fn is_plausible(declination: f64, lon: f64, lat: f64) -> bool {
    plausible_range(lon, lat).contains(&declination)
}

fn cache_key(lon: f64, lat: f64) -> (i64, i64) {
    ((lat * 100.0).round() as i64, (lon * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(f64);

    #[async_trait]
    impl DeclinationProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn declination(&self, _lon: f64, _lat: f64, _decimal_year: f64) -> Option<f64> {
            Some(self.0)
        }
    }

    struct Unavailable;

    #[async_trait]
    impl DeclinationProvider for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }
        async fn declination(&self, _lon: f64, _lat: f64, _decimal_year: f64) -> Option<f64> {
            None
        }
    }

    struct Counting(AtomicUsize);

    #[async_trait]
    impl DeclinationProvider for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        async fn declination(&self, _lon: f64, _lat: f64, _decimal_year: f64) -> Option<f64> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Some(6.25)
        }
    }

    #[tokio::test]
    async fn test_providers_tried_in_order() {
        let resolver = DeclinationResolver::with_providers(vec![
            Box::new(Unavailable),
            Box::new(Fixed(8.75)),
            Box::new(Fixed(1.0)),
        ]);
        let d = resolver.resolve_at(30.0, 50.0, offline::MODEL_EPOCH).await;
        assert_eq!(d, 8.75);
    }

    #[tokio::test]
    async fn test_offline_fallback_when_all_unavailable() {
        let resolver = DeclinationResolver::with_providers(vec![Box::new(Unavailable)]);
        let d = resolver.resolve_at(32.0, 51.0, offline::MODEL_EPOCH).await;
        assert!((d - 7.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_cache_short_circuits_providers() {
        let resolver =
            DeclinationResolver::with_providers(vec![Box::new(Counting(AtomicUsize::new(0)))]);
        let a = resolver.resolve_at(30.0, 50.0, offline::MODEL_EPOCH).await;
        let b = resolver.resolve_at(30.001, 50.001, offline::MODEL_EPOCH).await;
        assert_eq!(a, b);
        assert_eq!(resolver.cache_len(), 1);

        resolver.clear_cache();
        assert_eq!(resolver.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_never_fails_on_non_finite_input() {
        let resolver = DeclinationResolver::new();
        let d = resolver.resolve(f64::NAN, 50.0).await;
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_is_plausible() {
        assert!(is_plausible(7.0, 30.0, 50.0));
        assert!(!is_plausible(1.0, 30.0, 50.0));
        assert!(is_plausible(-20.0, -120.0, 45.0));
        assert!(!is_plausible(45.0, -120.0, 45.0));
    }
}
