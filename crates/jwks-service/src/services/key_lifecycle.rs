//! RSA signing-key lifecycle management.
//!
//! Owns the active and expired key stores, creates key pairs on demand, and
//! reclassifies active keys past their validity window into the expired
//! store via a periodic background sweep.
//!
//! # Features
//!
//! - Read-time expiry filtering independent of sweep cadence
//! - Lazy replenishment: read accessors re-create missing keys on demand
//! - Single lock over both stores (short critical sections, low contention)
//! - Key generation runs outside the lock on the blocking thread pool
//!
//! # Example
//!
//! ```rust,ignore
//! use jwks_service::services::key_lifecycle::{KeyLifecycleConfig, KeyLifecycleManager};
//!
//! let manager = KeyLifecycleManager::new(KeyLifecycleConfig::default());
//!
//! // Guarantees one active and one expired key, then begins sweeping.
//! manager.start().await?;
//!
//! let record = manager.signing_key().await?;
//! let jwks = manager.active_jwks(chrono::Utc::now()).await;
//!
//! manager.stop().await;
//! ```

use crate::crypto;
use crate::errors::JwksError;
use crate::models::{JsonWebKey, Jwks};
use chrono::{DateTime, Utc};
use jsonwebtoken::EncodingKey;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Default lifetime granted to newly created active keys (15 minutes).
pub const DEFAULT_ACTIVE_TTL_SECS: i64 = 15 * 60;

/// Default birth offset for manufactured expired keys (5 minutes in the past).
pub const DEFAULT_EXPIRED_OFFSET_SECS: i64 = -5 * 60;

/// Default interval between expiry sweeps, in milliseconds.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 2000;

/// Default modulus size for generated RSA key pairs.
pub const DEFAULT_RSA_KEY_BITS: usize = 2048;

// ============================================================================
// Key Record
// ============================================================================

/// One RSA key pair plus its public metadata.
///
/// The private half never leaves the record; JWKS consumers only ever see
/// the public JWK projection.
pub struct KeyRecord {
    kid: String,
    encoding_key: EncodingKey,
    public_jwk: JsonWebKey,
    expires_at: DateTime<Utc>,
}

impl KeyRecord {
    /// Key identifier, unique across the active and expired stores.
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Private signing key, borrowed for RS256 signing only.
    #[must_use]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Public half, shaped as an RFC 7517 JWK.
    #[must_use]
    pub fn public_jwk(&self) -> &JsonWebKey {
        &self.public_jwk
    }

    /// Absolute expiry timestamp. May predate creation for keys
    /// manufactured directly into the expired store.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the record's validity window has elapsed as of `at`.
    #[must_use]
    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        self.expires_at <= at
    }
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("kid", &self.kid)
            .field("encoding_key", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the key lifecycle manager.
#[derive(Debug, Clone)]
pub struct KeyLifecycleConfig {
    /// Lifetime granted to newly created active keys, in seconds.
    pub active_ttl_secs: i64,

    /// Birth offset applied when manufacturing an expired key, in seconds.
    /// Normally negative so the key is born past its validity window.
    pub expired_offset_secs: i64,

    /// Interval between background expiry sweeps.
    pub sweep_interval: Duration,

    /// Modulus size for generated RSA key pairs.
    pub rsa_key_bits: usize,
}

impl Default for KeyLifecycleConfig {
    fn default() -> Self {
        Self {
            active_ttl_secs: DEFAULT_ACTIVE_TTL_SECS,
            expired_offset_secs: DEFAULT_EXPIRED_OFFSET_SECS,
            sweep_interval: Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS),
            rsa_key_bits: DEFAULT_RSA_KEY_BITS,
        }
    }
}

impl KeyLifecycleConfig {
    /// Set the active key lifetime.
    #[must_use]
    pub fn with_active_ttl_secs(mut self, secs: i64) -> Self {
        self.active_ttl_secs = secs;
        self
    }

    /// Set the expired key birth offset.
    #[must_use]
    pub fn with_expired_offset_secs(mut self, secs: i64) -> Self {
        self.expired_offset_secs = secs;
        self
    }

    /// Set the sweep interval.
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the RSA modulus size.
    #[must_use]
    pub fn with_rsa_key_bits(mut self, bits: usize) -> Self {
        self.rsa_key_bits = bits;
        self
    }
}

// ============================================================================
// Key Stores
// ============================================================================

/// The two key collections, guarded together by one lock.
#[derive(Default)]
struct KeyStores {
    active: HashMap<String, Arc<KeyRecord>>,
    expired: HashMap<String, Arc<KeyRecord>>,
}

impl KeyStores {
    fn contains_kid(&self, kid: &str) -> bool {
        self.active.contains_key(kid) || self.expired.contains_key(kid)
    }

    /// Insert a freshly created record into the active store.
    ///
    /// A `kid` already present in either store is a defect, not a silent
    /// overwrite.
    fn insert_active(&mut self, record: Arc<KeyRecord>) -> Result<(), JwksError> {
        if self.contains_kid(record.kid()) {
            return Err(JwksError::KeyStore(format!(
                "Duplicate kid generated: {}",
                record.kid()
            )));
        }
        self.active.insert(record.kid().to_string(), record);
        Ok(())
    }

    /// Insert a freshly created record into the expired store.
    fn insert_expired(&mut self, record: Arc<KeyRecord>) -> Result<(), JwksError> {
        if self.contains_kid(record.kid()) {
            return Err(JwksError::KeyStore(format!(
                "Duplicate kid generated: {}",
                record.kid()
            )));
        }
        self.expired.insert(record.kid().to_string(), record);
        Ok(())
    }
}

// ============================================================================
// Key Lifecycle Manager
// ============================================================================

/// Manages active and expired RSA signing keys, handles expiry and rotation.
///
/// Constructed with its configuration, then [`start`](Self::start)ed, which
/// synchronously guarantees at least one active and one expired key before
/// periodic sweeping begins. [`stop`](Self::stop) cancels future sweeps; the
/// manager remains usable afterward for on-demand key creation triggered by
/// reads.
pub struct KeyLifecycleManager {
    stores: Arc<Mutex<KeyStores>>,
    config: KeyLifecycleConfig,
    sweep_handle: Mutex<Option<JoinHandle<()>>>,
}

impl KeyLifecycleManager {
    /// Create a manager with empty stores. No keys exist until `start` or
    /// a read accessor triggers creation.
    #[must_use]
    pub fn new(config: KeyLifecycleConfig) -> Self {
        Self {
            stores: Arc::new(Mutex::new(KeyStores::default())),
            config,
            sweep_handle: Mutex::new(None),
        }
    }

    /// Ensure one active and one expired key exist, then begin periodic
    /// sweeping. Idempotent: a second call leaves the running sweep alone.
    ///
    /// # Errors
    ///
    /// Fails if initial key generation fails; the service must not begin
    /// serving traffic in that case.
    pub async fn start(&self) -> Result<(), JwksError> {
        if self.config.sweep_interval.is_zero() {
            return Err(JwksError::KeyStore(
                "Sweep interval must be non-zero".to_string(),
            ));
        }

        let mut handle_guard = self.sweep_handle.lock().await;
        if handle_guard.is_some() {
            return Ok(());
        }

        self.ensure_active_key().await?;
        self.ensure_expired_key().await?;

        let stores = Arc::clone(&self.stores);
        let config = self.config.clone();
        *handle_guard = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                sweep(&stores, &config).await;
            }
        }));

        Ok(())
    }

    /// Cancel future sweep ticks.
    ///
    /// Replacement key generation already in flight is allowed to finish;
    /// the manager stays usable for on-demand creation, but no more
    /// time-based rotation occurs.
    pub async fn stop(&self) {
        if let Some(handle) = self.sweep_handle.lock().await.take() {
            handle.abort();
        }
    }

    /// Active records not expired as of `now`.
    ///
    /// Filters at read time rather than trusting active-store membership:
    /// the sweep runs on its own cadence and may lag real time.
    pub async fn active_keys(&self, now: DateTime<Utc>) -> Vec<Arc<KeyRecord>> {
        let stores = self.stores.lock().await;
        stores
            .active
            .values()
            .filter(|record| !record.is_expired(now))
            .cloned()
            .collect()
    }

    /// Public-key projection of the currently valid active records, shaped
    /// as an RFC 7517 JWK set.
    pub async fn active_jwks(&self, now: DateTime<Utc>) -> Jwks {
        let stores = self.stores.lock().await;
        Jwks {
            keys: stores
                .active
                .values()
                .filter(|record| !record.is_expired(now))
                .map(|record| record.public_jwk().clone())
                .collect(),
        }
    }

    /// Every record currently held in the expired store.
    pub async fn expired_keys(&self) -> Vec<Arc<KeyRecord>> {
        let stores = self.stores.lock().await;
        stores.expired.values().cloned().collect()
    }

    /// One active, unexpired record, creating one first if none exists.
    ///
    /// Selection among multiple valid records is arbitrary; callers must
    /// not depend on a particular ordering.
    pub async fn signing_key(&self) -> Result<Arc<KeyRecord>, JwksError> {
        if let Some(record) = self.pick_active(Utc::now()).await {
            return Ok(record);
        }

        self.ensure_active_key().await?;

        self.pick_active(Utc::now()).await.ok_or_else(|| {
            JwksError::KeyStore("No active signing key after replenishment".to_string())
        })
    }

    /// One record from the expired store, creating one first if the store
    /// is empty.
    pub async fn expired_signing_key(&self) -> Result<Arc<KeyRecord>, JwksError> {
        if let Some(record) = self.pick_expired().await {
            return Ok(record);
        }

        self.ensure_expired_key().await?;

        self.pick_expired().await.ok_or_else(|| {
            JwksError::KeyStore("No expired key after replenishment".to_string())
        })
    }

    /// Create one active key if no unexpired active record exists.
    ///
    /// Two concurrent callers over an empty store may each decide to create
    /// a key; the resulting extra key is accepted best-effort behavior.
    async fn ensure_active_key(&self) -> Result<(), JwksError> {
        let now = Utc::now();
        {
            let stores = self.stores.lock().await;
            if stores.active.values().any(|record| !record.is_expired(now)) {
                return Ok(());
            }
        }

        // Generate outside the lock; only the insert needs it.
        let record =
            create_key_record(self.config.active_ttl_secs, self.config.rsa_key_bits).await?;

        let mut stores = self.stores.lock().await;
        stores.insert_active(record)
    }

    /// Create one expired key if the expired store is empty. The key is
    /// born past its validity window and never passes through the active
    /// store.
    async fn ensure_expired_key(&self) -> Result<(), JwksError> {
        {
            let stores = self.stores.lock().await;
            if !stores.expired.is_empty() {
                return Ok(());
            }
        }

        let record =
            create_key_record(self.config.expired_offset_secs, self.config.rsa_key_bits).await?;

        let mut stores = self.stores.lock().await;
        stores.insert_expired(record)
    }

    async fn pick_active(&self, now: DateTime<Utc>) -> Option<Arc<KeyRecord>> {
        let stores = self.stores.lock().await;
        stores
            .active
            .values()
            .find(|record| !record.is_expired(now))
            .cloned()
    }

    async fn pick_expired(&self) -> Option<Arc<KeyRecord>> {
        let stores = self.stores.lock().await;
        stores.expired.values().next().cloned()
    }
}

impl Drop for KeyLifecycleManager {
    fn drop(&mut self) {
        // Best-effort cleanup if the manager is dropped without stop().
        if let Ok(mut guard) = self.sweep_handle.try_lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}

// ============================================================================
// Key Creation & Sweep
// ============================================================================

/// Create a new key record with a freshly generated RSA key pair.
///
/// `lifetime_secs` may be negative to manufacture an already-expired record.
/// Generation runs on the blocking thread pool; the caller decides which
/// store the record is inserted into.
async fn create_key_record(
    lifetime_secs: i64,
    rsa_key_bits: usize,
) -> Result<Arc<KeyRecord>, JwksError> {
    let material = tokio::task::spawn_blocking(move || crypto::generate_rsa_key(rsa_key_bits))
        .await
        .map_err(|e| JwksError::Crypto(format!("Key generation task failed: {}", e)))??;

    let kid = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + chrono::Duration::seconds(lifetime_secs);

    let public_jwk = JsonWebKey {
        kid: kid.clone(),
        kty: "RSA".to_string(),
        n: material.modulus,
        e: material.exponent,
        use_: "sig".to_string(),
        alg: "RS256".to_string(),
    };

    Ok(Arc::new(KeyRecord {
        kid,
        encoding_key: material.encoding_key,
        public_jwk,
        expires_at,
    }))
}

/// One reclassification pass: move active records past their expiry into
/// the expired store (kid preserved), then trigger replacement creation if
/// the active store drained.
///
/// Replacement generation is deliberately not awaited; there is a window,
/// bounded by one generation latency, during which the active store may be
/// observably empty. Read accessors self-heal through ensure-active, so
/// this is a latency window, not a correctness violation.
async fn sweep(stores: &Arc<Mutex<KeyStores>>, config: &KeyLifecycleConfig) {
    let now = Utc::now();

    let needs_replacement = {
        let mut guard = stores.lock().await;

        let rotated: Vec<String> = guard
            .active
            .values()
            .filter(|record| record.is_expired(now))
            .map(|record| record.kid().to_string())
            .collect();

        for kid in rotated {
            if let Some(record) = guard.active.remove(&kid) {
                debug!(
                    target: "jwks_service.key_lifecycle",
                    kid = %kid,
                    "Active key expired, moved to expired store"
                );
                guard.expired.insert(kid, record);
            }
        }

        guard.active.is_empty()
    };

    if needs_replacement {
        let stores = Arc::clone(stores);
        let ttl = config.active_ttl_secs;
        let bits = config.rsa_key_bits;
        tokio::spawn(async move {
            match create_key_record(ttl, bits).await {
                Ok(record) => {
                    let mut guard = stores.lock().await;
                    if let Err(e) = guard.insert_active(record) {
                        warn!(
                            target: "jwks_service.key_lifecycle",
                            error = %e,
                            "Failed to insert replacement active key"
                        );
                    }
                }
                Err(e) => {
                    warn!(
                        target: "jwks_service.key_lifecycle",
                        error = %e,
                        "Replacement key generation failed"
                    );
                }
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
