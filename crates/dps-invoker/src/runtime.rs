// Path: crates/dps-invoker/src/runtime.rs
//! `Invoker`: compiles and executes scripts against a point-in-time ledger
//! view (`spec.md` §4.7), backed by any `IndexReader`.
//!
//! VM: `wasmtime`, matching the teacher's `ioi-vm-wasm` crate's engine
//! choice. Unlike the teacher's component-model/WIT setup in
//! `vm/wasm/src/lib.rs` (built for a contract lifecycle with `manifest`/
//! `id`/`prepare-upgrade` entrypoints this service has no use for), scripts
//! here are plain core-wasm modules with a minimal host ABI: one import
//! (`env.read_register`) and two exports (`alloc`, `run`). The simpler
//! surface is enough for `spec.md` §4.7's `Script(height, source, args) →
//! value` contract and avoids carrying a WIT toolchain this service's
//! scripts have no other use for.

use crate::cache::RegisterCache;
use crate::config::InvokerConfig;
use crate::storage_view::{AccountSnapshot, StorageView};
use dps_api::IndexReader;
use dps_types::{AccountAddress, DpsError, Height, LedgerPath};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use wasmtime::{Caller, Config, Engine, Linker, Module, Store};

/// Host state visible to a single script invocation's imported functions.
struct HostState<I> {
    view: StorageView<I>,
    cancel: CancellationToken,
    error: Mutex<Option<DpsError>>,
}

/// Compiles and executes scripts against a point-in-time, Index-Reader-backed
/// ledger view, with a shared byte-budgeted register-read cache.
pub struct Invoker<I> {
    engine: Engine,
    index: Arc<I>,
    modules: Mutex<HashMap<[u8; 32], Module>>,
    module_cache_capacity: usize,
    register_cache: Arc<RegisterCache>,
}

impl<I: IndexReader + 'static> Invoker<I> {
    /// Builds an `Invoker` over `index`, rejecting a zero-byte register
    /// cache budget or zero module cache capacity via `config.validate()`.
    pub fn new(index: Arc<I>, config: InvokerConfig) -> Result<Self, DpsError> {
        config.validate()?;

        let mut wasm_config = Config::new();
        wasm_config.async_support(true);
        let engine = Engine::new(&wasm_config)
            .map_err(|e| DpsError::Config(format!("wasmtime engine init failed: {e}")))?;

        Ok(Self {
            engine,
            index,
            modules: Mutex::new(HashMap::new()),
            module_cache_capacity: config.module_cache_capacity,
            register_cache: Arc::new(RegisterCache::new(config.register_cache_bytes)),
        })
    }

    fn compiled_module(&self, source: &[u8]) -> Result<Module, DpsError> {
        let hash = dps_types::hash::sha256(source);
        if let Some(module) = self.modules.lock().unwrap().get(&hash) {
            return Ok(module.clone());
        }
        let module = Module::new(&self.engine, source)
            .map_err(|e| DpsError::Invocation(format!("invalid script module: {e}")))?;

        let mut modules = self.modules.lock().unwrap();
        if modules.len() >= self.module_cache_capacity {
            // No LRU bookkeeping here: the compiled-module cache only needs
            // to bound memory, and an unlucky eviction just costs a
            // recompile, not a correctness issue the way register eviction
            // would be.
            if let Some(evict_key) = modules.keys().next().copied() {
                modules.remove(&evict_key);
            }
        }
        modules.insert(hash, module.clone());
        Ok(module)
    }

    fn linker(&self) -> Result<Linker<HostState<I>>, DpsError> {
        let mut linker = Linker::new(&self.engine);
        linker
            .func_wrap_async(
                "env",
                "read_register",
                |mut caller: Caller<'_, HostState<I>>, (path_ptr, path_len, out_ptr, out_cap): (u32, u32, u32, u32)|
                 -> Box<dyn std::future::Future<Output = u32> + Send + '_> {
                    Box::new(async move {
                        if path_len != 32 {
                            *caller.data().error.lock().unwrap() = Some(DpsError::Invocation(
                                format!("register path must be 32 bytes, got {path_len}"),
                            ));
                            return u32::MAX;
                        }
                        let memory = match caller.get_export("memory").and_then(|e| e.into_memory()) {
                            Some(m) => m,
                            None => {
                                *caller.data().error.lock().unwrap() =
                                    Some(DpsError::Invocation("script has no exported memory".into()));
                                return u32::MAX;
                            }
                        };
                        let mut raw = [0u8; 32];
                        if memory
                            .read(&caller, path_ptr as usize, &mut raw)
                            .is_err()
                        {
                            *caller.data().error.lock().unwrap() =
                                Some(DpsError::Invocation("path read out of bounds".into()));
                            return u32::MAX;
                        }
                        let path = LedgerPath::new(raw);

                        let cancel = caller.data().cancel.clone();
                        let read = caller.data().view.get(path, &cancel).await;
                        let value = match read {
                            Ok(v) => v,
                            Err(e) => {
                                *caller.data().error.lock().unwrap() = Some(e);
                                return u32::MAX;
                            }
                        };

                        if value.len() > out_cap as usize {
                            *caller.data().error.lock().unwrap() = Some(DpsError::Invocation(
                                "register value exceeds output buffer capacity".into(),
                            ));
                            return u32::MAX;
                        }
                        if memory.write(&mut caller, out_ptr as usize, &value).is_err() {
                            *caller.data().error.lock().unwrap() =
                                Some(DpsError::Invocation("output write out of bounds".into()));
                            return u32::MAX;
                        }
                        value.len() as u32
                    })
                },
            )
            .map_err(|e| DpsError::Invocation(format!("failed to link host imports: {e}")))?;
        Ok(linker)
    }

    /// Executes `source` against the ledger as of `height`, passing `args`
    /// verbatim to the script's `run` export and returning its raw output
    /// bytes. Per `spec.md` §4.7, script syntax/runtime errors and index
    /// errors during register reads are surfaced verbatim, never wrapped.
    pub async fn script(
        &self,
        height: Height,
        source: &[u8],
        args: &[u8],
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, DpsError> {
        let module = self.compiled_module(source)?;
        let linker = self.linker()?;

        let view = StorageView::new(self.index.clone(), height, self.register_cache.clone());
        let host_state = HostState {
            view,
            cancel: cancel.clone(),
            error: Mutex::new(None),
        };
        let mut store = Store::new(&self.engine, host_state);

        let instance = linker
            .instantiate_async(&mut store, &module)
            .await
            .map_err(|e| DpsError::Invocation(format!("instantiation failed: {e}")))?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| DpsError::Invocation("script has no exported memory".to_string()))?;
        let alloc = instance
            .get_typed_func::<u32, u32>(&mut store, "alloc")
            .map_err(|e| DpsError::Invocation(format!("script missing alloc export: {e}")))?;
        let run = instance
            .get_typed_func::<(u32, u32), u64>(&mut store, "run")
            .map_err(|e| DpsError::Invocation(format!("script missing run export: {e}")))?;

        let args_ptr = alloc
            .call_async(&mut store, args.len() as u32)
            .await
            .map_err(|e| DpsError::Invocation(format!("script trapped in alloc: {e}")))?;
        memory
            .write(&mut store, args_ptr as usize, args)
            .map_err(|e| DpsError::Invocation(format!("argument write out of bounds: {e}")))?;

        let packed = run
            .call_async(&mut store, (args_ptr, args.len() as u32))
            .await
            .map_err(|e| DpsError::Invocation(format!("script trapped: {e}")))?;

        if let Some(err) = store.data().error.lock().unwrap().take() {
            return Err(err);
        }

        let out_ptr = (packed >> 32) as u32 as usize;
        let out_len = (packed & 0xffff_ffff) as u32 as usize;
        let mut out = vec![0u8; out_len];
        memory
            .read(&store, out_ptr, &mut out)
            .map_err(|e| DpsError::Invocation(format!("return value read out of bounds: {e}")))?;
        Ok(out)
    }

    /// Returns a per-invocation, account-scoped register view as of
    /// `header`'s height, sharing this invoker's register-read cache.
    pub fn account(
        &self,
        address: AccountAddress,
        header: &dps_types::Header,
    ) -> AccountSnapshot<I> {
        let view = StorageView::new(self.index.clone(), header.height, self.register_cache.clone());
        AccountSnapshot::new(address, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dps_test_utils::InMemoryIndex;

    #[test]
    fn zero_budget_config_is_rejected_before_engine_construction() {
        let index = Arc::new(InMemoryIndex::empty());
        let config = InvokerConfig {
            register_cache_bytes: 0,
            module_cache_capacity: 4,
        };
        let err = Invoker::new(index, config).unwrap_err();
        assert!(matches!(err, DpsError::Config(_)));
    }

    #[test]
    fn valid_config_constructs_an_invoker() {
        let index = Arc::new(InMemoryIndex::empty());
        let invoker = Invoker::new(index, InvokerConfig::default());
        assert!(invoker.is_ok());
    }

    /// A core-wasm script with no arguments that reads a single fixed
    /// register path (the 32 bytes `0xab` repeated, embedded in its own
    /// data segment) and returns the raw bytes `env.read_register` wrote
    /// into its output buffer, packed as `(ptr << 32) | len`.
    ///
    /// The register's stored value is itself a SCALE-encoded
    /// `ScalarValue::UInt(7)`, so the script's return bytes decode cleanly
    /// via `dps_types::convert::decode_result` — this is `spec.md` §8's S7
    /// scenario end to end: "a script that reads path `p` and returns it
    /// as a UInt64".
    const READ_FIXED_PATH_WAT: &str = r#"
        (module
            (import "env" "read_register"
                (func $read_register (param i32 i32 i32 i32) (result i32)))
            (memory (export "memory") 1)
            (data (i32.const 0)
                "\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab"
                "\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab\ab")
            (func (export "alloc") (param $len i32) (result i32)
                (i32.const 512))
            (func (export "run") (param $args_ptr i32) (param $args_len i32) (result i64)
                (local $n i32)
                (local.set $n
                    (call $read_register (i32.const 0) (i32.const 32) (i32.const 64) (i32.const 64)))
                (i64.or
                    (i64.shl (i64.const 64) (i64.const 32))
                    (i64.extend_i32_u (local.get $n))))
        )
    "#;

    #[tokio::test]
    async fn script_reads_a_register_and_returns_it_as_a_scalar() {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(dps_telemetry::metrics::install);

        let path = LedgerPath::new([0xab; 32]);
        let stored = dps_types::convert::ScalarValue::UInt(7);
        let value: LedgerValue = dps_types::codec::encode(&stored).unwrap();
        let index = Arc::new(InMemoryIndex::with_register(200, path, value));

        let invoker = Invoker::new(index, InvokerConfig::default()).unwrap();
        let cancel = CancellationToken::new();
        let out = invoker
            .script(200, READ_FIXED_PATH_WAT.as_bytes(), &[], &cancel)
            .await
            .unwrap();

        let decoded = dps_types::convert::decode_result(&out).unwrap();
        assert_eq!(decoded, dps_types::convert::ScalarValue::UInt(7));
    }

    #[tokio::test]
    async fn script_compiling_failure_is_surfaced_as_invocation_error() {
        let index = Arc::new(InMemoryIndex::empty());
        let invoker = Invoker::new(index, InvokerConfig::default()).unwrap();
        let cancel = CancellationToken::new();
        let err = invoker
            .script(1, b"not a valid wasm module", &[], &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, DpsError::Invocation(_)));
    }
}
