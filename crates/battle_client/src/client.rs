//! The client facade: validate, encode, run, decode.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use battle_core::attributes::{AttributeTable, UnitAttributes};
use battle_core::combatant::Combatant;
use battle_core::error::Result;
use battle_core::outcome::BattleOutcome;
use battle_core::protocol::{decode_output, encode_input, EncodedInput};
use battle_core::unit_kind::UnitKind;
use rayon::ThreadPool;
use tracing::debug;

use crate::batch::{build_pool, run_batch, run_batch_each};
use crate::config::ClientConfig;
use crate::engine::{CancelToken, Engine};
use crate::process::ProcessEngine;
use crate::seed::{check_seed, draw_seed, resolve_seeds, RandomSeeds, SeedSource};

/// Client bound to one engine and one attribute table.
///
/// The attribute table is shared read-only by every run. Each call builds
/// its own encoded input and each run owns its own process and buffers, so
/// one client can be used from several threads at once.
pub struct BattleEngine<E = ProcessEngine> {
    engine: E,
    attributes: Arc<AttributeTable>,
    seeds: Arc<dyn SeedSource>,
    config: ClientConfig,
    pool: ThreadPool,
}

impl BattleEngine<ProcessEngine> {
    /// Create a client for the engine binary at `engine_path`.
    pub fn new(
        engine_path: impl Into<PathBuf>,
        attributes: impl Into<Arc<AttributeTable>>,
    ) -> Result<Self> {
        Self::with_config(engine_path, attributes, ClientConfig::default())
    }

    /// Create a client from attributes keyed by kind.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidAttributes`](battle_core::error::BattleError::InvalidAttributes)
    /// if the kinds are not exactly `0..N` or a rapid-fire target is unknown.
    pub fn from_units(
        engine_path: impl Into<PathBuf>,
        units: BTreeMap<UnitKind, UnitAttributes>,
    ) -> Result<Self> {
        Self::new(engine_path, AttributeTable::from_map(units)?)
    }

    /// Create a client for the engine binary at `engine_path` with `config`.
    pub fn with_config(
        engine_path: impl Into<PathBuf>,
        attributes: impl Into<Arc<AttributeTable>>,
        config: ClientConfig,
    ) -> Result<Self> {
        Self::with_engine(ProcessEngine::new(engine_path)?, attributes, config)
    }
}

impl<E: Engine> BattleEngine<E> {
    /// Create a client around any [`Engine`].
    pub fn with_engine(
        engine: E,
        attributes: impl Into<Arc<AttributeTable>>,
        config: ClientConfig,
    ) -> Result<Self> {
        let pool = build_pool(config.worker_threads())?;
        Ok(Self {
            engine,
            attributes: attributes.into(),
            seeds: Arc::new(RandomSeeds),
            config,
            pool,
        })
    }

    /// Replace the source of seeds drawn for seed `0`.
    pub fn with_seed_source(mut self, seeds: impl SeedSource + 'static) -> Self {
        self.seeds = Arc::new(seeds);
        self
    }

    /// The shared attribute table.
    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }

    /// The underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Validate and encode an engagement without running it.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidRoster`](battle_core::error::BattleError::InvalidRoster)
    /// if either side is invalid.
    pub fn prepare(&self, attackers: &[Combatant], defenders: &[Combatant]) -> Result<EncodedInput> {
        encode_input(&self.attributes, attackers, defenders)
    }

    /// Run one engagement and wait for it.
    ///
    /// Seed `0` draws a fresh seed. `timeout` falls back to the configured
    /// default; with neither, the run is unbounded.
    ///
    /// # Errors
    ///
    /// Pre-flight failures (`InvalidRoster`, `InvalidSeed`) are returned
    /// before anything is spawned. Otherwise `EngineTimeout`,
    /// `EngineFailure` or `MalformedOutput` describe what went wrong.
    pub fn battle(
        &self,
        attackers: &[Combatant],
        defenders: &[Combatant],
        seed: i64,
        timeout: Option<Duration>,
    ) -> Result<BattleOutcome> {
        let input = self.prepare(attackers, defenders)?;
        let seed = match check_seed(seed)? {
            Some(seed) => seed,
            None => draw_seed(self.seeds.as_ref())?,
        };
        self.run_encoded(&input, seed, timeout, &CancelToken::new())
    }

    /// Run `count` independent engagements of the same rosters.
    ///
    /// With seed `0` every run draws its own seed; otherwise every run reuses
    /// `seed`. Runs execute concurrently on at most `max_parallel_runs`
    /// workers and outcome `i` belongs to run `i`.
    ///
    /// # Errors
    ///
    /// The first failing run aborts the batch and its error is returned; no
    /// partial outcomes are returned.
    pub fn simulate(
        &self,
        attackers: &[Combatant],
        defenders: &[Combatant],
        seed: i64,
        count: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<BattleOutcome>> {
        let input = self.prepare(attackers, defenders)?;
        let seeds = resolve_seeds(seed, count, self.seeds.as_ref())?;
        run_batch(&self.pool, &seeds, |index, seed, cancel| {
            debug!(index, seed, "Starting run");
            self.run_encoded(&input, seed, timeout, cancel)
        })
    }

    /// Like [`BattleEngine::simulate`], but collect every run's result
    /// instead of stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Only pre-flight failures are returned as the outer error.
    pub fn simulate_each(
        &self,
        attackers: &[Combatant],
        defenders: &[Combatant],
        seed: i64,
        count: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<Result<BattleOutcome>>> {
        let input = self.prepare(attackers, defenders)?;
        let seeds = resolve_seeds(seed, count, self.seeds.as_ref())?;
        Ok(run_batch_each(&self.pool, &seeds, |_, seed, cancel| {
            self.run_encoded(&input, seed, timeout, cancel)
        }))
    }

    /// Run a pre-encoded engagement with a resolved seed.
    pub fn run_encoded(
        &self,
        input: &EncodedInput,
        seed: u32,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<BattleOutcome> {
        let timeout = timeout.or_else(|| self.config.default_timeout());
        let output = self
            .engine
            .run_cancellable(seed, input.bytes(), timeout, cancel)?;
        decode_output(&output.stdout, &input.layout(), seed)
    }
}

impl<E> std::fmt::Debug for BattleEngine<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleEngine")
            .field("num_kinds", &self.attributes.num_kinds())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use battle_core::attributes::UnitAttributes;
    use battle_core::error::{BattleError, ErrorKind};

    use super::*;
    use crate::engine::EngineOutput;

    /// Prints zero rounds and records every seed and input it sees.
    #[derive(Default)]
    struct RecordingEngine {
        seeds: Mutex<Vec<u32>>,
        inputs: Mutex<Vec<Vec<u8>>>,
        timeouts: Mutex<Vec<Option<Duration>>>,
    }

    impl Engine for RecordingEngine {
        fn run(&self, seed: u32, input: &[u8], timeout: Option<Duration>) -> Result<EngineOutput> {
            self.seeds.lock().unwrap().push(seed);
            self.inputs.lock().unwrap().push(input.to_vec());
            self.timeouts.lock().unwrap().push(timeout);
            Ok(EngineOutput::new("0\n"))
        }
    }

    fn table() -> AttributeTable {
        AttributeTable::new(vec![
            UnitAttributes::new(50.0, 10.0, 4000.0, []).unwrap(),
            UnitAttributes::new(0.01, 0.5, 1000.0, []).unwrap(),
        ])
        .unwrap()
    }

    fn fleet(kind: u8, count: u64) -> Vec<Combatant> {
        vec![Combatant::new(0, 0, 0, [(UnitKind::new(kind), count)]).unwrap()]
    }

    fn client(config: ClientConfig) -> BattleEngine<Arc<RecordingEngine>> {
        BattleEngine::with_engine(Arc::new(RecordingEngine::default()), table(), config).unwrap()
    }

    #[test]
    fn test_battle_runs_with_explicit_seed() {
        let client = client(ClientConfig::default());
        let outcome = client.battle(&fleet(0, 3), &fleet(1, 5), 77, None).unwrap();

        assert_eq!(outcome.seed, 77);
        assert_eq!(outcome.num_rounds, 0);
        assert_eq!(outcome.attackers().len(), 1);
        assert_eq!(outcome.defenders().len(), 1);
        assert_eq!(*client.engine().seeds.lock().unwrap(), vec![77]);

        let expected = client.prepare(&fleet(0, 3), &fleet(1, 5)).unwrap();
        assert_eq!(client.engine().inputs.lock().unwrap()[0], expected.bytes());
    }

    #[test]
    fn test_zero_seed_draws_from_source() {
        let counter = AtomicU32::new(500);
        let client = client(ClientConfig::default())
            .with_seed_source(move || counter.fetch_add(1, Ordering::SeqCst));

        let outcome = client.battle(&fleet(0, 1), &fleet(1, 1), 0, None).unwrap();
        assert_eq!(outcome.seed, 500);

        let outcomes = client.simulate(&fleet(0, 1), &fleet(1, 1), 0, 3, None).unwrap();
        let seeds: Vec<u32> = outcomes.iter().map(|o| o.seed).collect();
        assert_eq!(seeds, vec![501, 502, 503]);
    }

    #[test]
    fn test_preflight_errors_spawn_nothing() {
        let client = client(ClientConfig::default());

        let err = client.battle(&fleet(7, 1), &fleet(1, 1), 1, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRoster);

        let err = client.simulate(&fleet(0, 1), &fleet(1, 1), -5, 4, None).unwrap_err();
        assert_eq!(err, BattleError::InvalidSeed(-5));

        assert!(client.engine().seeds.lock().unwrap().is_empty());
    }

    #[test]
    fn test_default_timeout_applies() {
        let client = client(ClientConfig::default().with_default_timeout(Duration::from_millis(250)));
        client.battle(&fleet(0, 1), &fleet(1, 1), 1, None).unwrap();
        client
            .battle(&fleet(0, 1), &fleet(1, 1), 1, Some(Duration::from_secs(2)))
            .unwrap();

        assert_eq!(
            *client.engine().timeouts.lock().unwrap(),
            vec![Some(Duration::from_millis(250)), Some(Duration::from_secs(2))]
        );
    }

    #[test]
    fn test_simulate_each_reports_every_run() {
        struct FlakyEngine(AtomicUsize);

        impl Engine for FlakyEngine {
            fn run(&self, _: u32, _: &[u8], _: Option<Duration>) -> Result<EngineOutput> {
                if self.0.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                    Ok(EngineOutput::new("0"))
                } else {
                    Ok(EngineOutput::new("garbage"))
                }
            }
        }

        let client = BattleEngine::with_engine(
            FlakyEngine(AtomicUsize::new(0)),
            table(),
            ClientConfig::default().with_parallel_runs(1),
        )
        .unwrap();

        let results = client.simulate_each(&fleet(0, 1), &fleet(1, 1), 9, 4, None).unwrap();
        assert_eq!(results.len(), 4);
        let failures = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(failures, 2);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.kind(), ErrorKind::MalformedOutput);
        }
    }

    #[test]
    fn test_simulate_zero_count() {
        let client = client(ClientConfig::default());
        let outcomes = client.simulate(&fleet(0, 1), &fleet(1, 1), 0, 0, None).unwrap();
        assert!(outcomes.is_empty());
        assert!(client.engine().seeds.lock().unwrap().is_empty());
    }
}
