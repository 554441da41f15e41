// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Guest instantiation and the per-compile session.
//!
//! A [`GuestModule`] is the compiled guest and can be instantiated any number
//! of times. A [`CompileSession`] owns one instance, its store, and the
//! session's [`LogChannel`]; every operation takes `&mut self`, so at most one
//! call into the guest is ever outstanding per session.
//!
//! ## Call sequence
//!
//! 1. `load_filesystem` copies the packaged image into a `get_romfs` buffer (optional)
//! 2. `prepare_inputs` encodes the options JSON, then the source
//! 3. `compile_program` runs; the guest streams diagnostics through the log callbacks
//! 4. `decode_result` reads the length-prefixed payload at the returned pointer

use crate::guest::detector::inspect_guest;
use crate::guest::engine::create_engine;
use crate::guest::error::{GuestError, GuestResult};
use crate::guest::loader::{check_artifact_size, load_artifact, FilesystemImage, GUEST_MODULE};
use crate::guest::log_channel::{self, LogChannel};
use crate::guest::marshal::{
    EncodedString, GuestAllocator, StringMarshaller, ALLOC_EXPORT, ROMFS_ALLOC_EXPORT,
};
use crate::guest::memory::{GuestPtr, GuestRegion, MemoryView, MEMORY_EXPORT};
use crate::guest::result::{decode_result, ResultOutcome};
use crate::observability::messages::guest::{
    ArgumentsIgnored, CompileReturned, EntryPointResolved, FilesystemLoaded, GuestInspected,
    InputsPrepared, SessionInstantiated,
};
use crate::options::OptionsList;
use std::fmt;
use std::path::Path;
use wasmtime::{Engine, Func, Instance, Linker, Module, Store};

/// Compile entry point export.
pub const COMPILE_EXPORT: &str = "compile_program";

/// Data carried by each session's store.
pub struct HostState {
    log: LogChannel,
}

fn log_channel_of(state: &mut HostState) -> &mut LogChannel {
    &mut state.log
}

/// The compiled compiler guest.
#[derive(Clone)]
pub struct GuestModule {
    engine: Engine,
    module: Module,
    fuel: u64,
}

impl GuestModule {
    /// Inspects and compiles guest bytes. Each session gets `fuel` units.
    ///
    /// A guest missing `memory`, `allocUint8` or `compile_program` is
    /// rejected here rather than at instantiation. `get_romfs` is optional.
    pub fn from_bytes(bytes: &[u8], fuel: u64) -> GuestResult<Self> {
        check_artifact_size(bytes.len())?;
        let manifest = inspect_guest(bytes)?;
        manifest.require_exports(&[MEMORY_EXPORT, ALLOC_EXPORT, COMPILE_EXPORT])?;
        tracing::debug!(
            "{}",
            GuestInspected {
                imports: manifest.imports.len(),
                exports: manifest.exports.len(),
                log_channel: manifest.uses_log_channel(),
            }
        );

        let engine = create_engine()?;
        let module = Module::new(&engine, bytes)?;

        Ok(Self {
            engine,
            module,
            fuel,
        })
    }

    /// Reads, inspects and compiles the guest at `path`.
    pub fn load<P: AsRef<Path>>(path: P, fuel: u64) -> GuestResult<Self> {
        let bytes = load_artifact(GUEST_MODULE, path)?;
        Self::from_bytes(&bytes, fuel)
    }

    pub fn fuel(&self) -> u64 {
        self.fuel
    }

    /// Creates a fresh instance wired to `log`.
    pub fn instantiate(&self, log: LogChannel) -> GuestResult<CompileSession> {
        let mut store = Store::new(&self.engine, HostState { log });
        store.set_fuel(self.fuel)?;

        let mut linker = Linker::new(&self.engine);
        log_channel::add_to_linker(&mut linker, log_channel_of)?;

        let instance = linker.instantiate(&mut store, &self.module)?;
        let view = MemoryView::from_instance(&mut store, &instance)?;
        let allocator = GuestAllocator::from_instance(&mut store, &instance, ALLOC_EXPORT)?;

        tracing::info!(
            "{}",
            SessionInstantiated {
                memory_bytes: view.size(&store),
                fuel: self.fuel,
            }
        );

        Ok(CompileSession {
            store,
            instance,
            view,
            marshaller: StringMarshaller::new(view, allocator),
            initial_fuel: self.fuel,
            filesystem: None,
        })
    }
}

/// Shape of the guest's `compile_program` export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPointForm {
    /// `() -> ptr`: compiles a built-in default program.
    NoArgs,
    /// `(sourcePtr) -> ptr`: guest applies its own default options.
    SourceOnly,
    /// `(optionsPtr, sourcePtr) -> ptr`: the full contract.
    OptionsAndSource,
}

impl fmt::Display for EntryPointForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPointForm::NoArgs => write!(f, "compile_program()"),
            EntryPointForm::SourceOnly => write!(f, "compile_program(source)"),
            EntryPointForm::OptionsAndSource => write!(f, "compile_program(options, source)"),
        }
    }
}

/// One live guest instance and its log channel.
pub struct CompileSession {
    store: Store<HostState>,
    instance: Instance,
    view: MemoryView,
    marshaller: StringMarshaller,
    initial_fuel: u64,
    filesystem: Option<GuestRegion>,
}

impl CompileSession {
    pub fn view(&self) -> MemoryView {
        self.view
    }

    pub fn store(&self) -> &Store<HostState> {
        &self.store
    }

    pub fn log(&self) -> &LogChannel {
        &self.store.data().log
    }

    pub fn log_mut(&mut self) -> &mut LogChannel {
        &mut self.store.data_mut().log
    }

    /// Consumes the session, keeping only what the guest logged.
    pub fn into_log(self) -> LogChannel {
        self.store.into_data().log
    }

    /// Region the filesystem image was copied to, if it was loaded.
    pub fn filesystem(&self) -> Option<GuestRegion> {
        self.filesystem
    }

    pub fn fuel_consumed(&self) -> u64 {
        self.initial_fuel
            .saturating_sub(self.store.get_fuel().unwrap_or(0))
    }

    pub fn encode_string(&mut self, text: &str) -> GuestResult<EncodedString> {
        self.marshaller.encode(&mut self.store, text)
    }

    pub fn decode_string(&self, ptr: GuestPtr, length: u32) -> GuestResult<String> {
        self.marshaller.decode(&self.store, ptr, length)
    }

    /// Copies `image` verbatim into a guest buffer sized to its length.
    ///
    /// Must run before `compile` for sessions that need filesystem-backed
    /// includes.
    pub fn load_filesystem(&mut self, image: &FilesystemImage) -> GuestResult<GuestRegion> {
        let size = u32::try_from(image.len()).map_err(|_| GuestError::InputTooLarge(image.len()))?;
        let allocator = GuestAllocator::from_instance(&mut self.store, &self.instance, ROMFS_ALLOC_EXPORT)?;

        let region = allocator.allocate(&mut self.store, size)?;
        self.view.write_region(&mut self.store, region, image.as_bytes())?;

        tracing::info!(
            "{}",
            FilesystemLoaded {
                ptr: region.ptr(),
                size_bytes: image.len(),
            }
        );

        self.filesystem = Some(region);
        Ok(region)
    }

    /// Encodes the options as a JSON array, then the source, into guest memory.
    ///
    /// The order is fixed: options first, source second.
    pub fn prepare_inputs(
        &mut self,
        options: &OptionsList,
        source: &str,
    ) -> GuestResult<(EncodedString, EncodedString)> {
        let options_json = options.to_json()?;
        let options_ptr = self.encode_string(&options_json)?;
        let source_ptr = self.encode_string(source)?;

        tracing::debug!(
            "{}",
            InputsPrepared {
                options_ptr: options_ptr.ptr(),
                source_ptr: source_ptr.ptr(),
                source_len: source_ptr.text_len(),
            }
        );

        Ok((options_ptr, source_ptr))
    }

    /// Inspects the `compile_program` export's signature.
    pub fn entry_point_form(&mut self) -> GuestResult<EntryPointForm> {
        let func = self.compile_func()?;
        let ty = func.ty(&self.store);
        let form = match ty.params().len() {
            0 => EntryPointForm::NoArgs,
            1 => EntryPointForm::SourceOnly,
            2 => EntryPointForm::OptionsAndSource,
            n => {
                return Err(GuestError::SignatureMismatch {
                    name: COMPILE_EXPORT.to_string(),
                    detail: format!("expected 0, 1 or 2 i32 parameters, found {}", n),
                })
            }
        };
        Ok(form)
    }

    /// Encodes inputs for whichever entry-point form the guest exports, runs
    /// the compile synchronously, and returns the result pointer.
    ///
    /// Log callbacks fire on this thread while the guest runs.
    pub fn compile(&mut self, options: &OptionsList, source: &str) -> GuestResult<GuestPtr> {
        let form = self.entry_point_form()?;
        tracing::debug!("{}", EntryPointResolved { form });

        let func = self.compile_func()?;
        let raw = match form {
            EntryPointForm::OptionsAndSource => {
                let (options_ptr, source_ptr) = self.prepare_inputs(options, source)?;
                func.typed::<(i32, i32), i32>(&self.store)
                    .map_err(Self::mismatch)?
                    .call(&mut self.store, (options_ptr.ptr().to_wasm(), source_ptr.ptr().to_wasm()))?
            }
            EntryPointForm::SourceOnly => {
                if !options.is_empty() {
                    tracing::warn!("{}", ArgumentsIgnored { form, ignored: "options" });
                }
                let source_ptr = self.encode_string(source)?;
                func.typed::<i32, i32>(&self.store)
                    .map_err(Self::mismatch)?
                    .call(&mut self.store, source_ptr.ptr().to_wasm())?
            }
            EntryPointForm::NoArgs => {
                if !options.is_empty() || !source.is_empty() {
                    tracing::warn!("{}", ArgumentsIgnored { form, ignored: "options and source" });
                }
                func.typed::<(), i32>(&self.store)
                    .map_err(Self::mismatch)?
                    .call(&mut self.store, ())?
            }
        };

        let ptr = GuestPtr::from_wasm(raw);
        tracing::info!(
            "{}",
            CompileReturned {
                ptr,
                fuel_consumed: self.fuel_consumed(),
            }
        );
        Ok(ptr)
    }

    /// Reads the length-prefixed result region at `ptr`.
    pub fn decode_result(&self, ptr: GuestPtr) -> GuestResult<ResultOutcome> {
        decode_result(&self.view, &self.store, ptr)
    }

    fn compile_func(&mut self) -> GuestResult<Func> {
        self.instance
            .get_func(&mut self.store, COMPILE_EXPORT)
            .ok_or_else(|| GuestError::MissingExport(COMPILE_EXPORT.to_string()))
    }

    fn mismatch(error: wasmtime::Error) -> GuestError {
        GuestError::SignatureMismatch {
            name: COMPILE_EXPORT.to_string(),
            detail: error.to_string(),
        }
    }
}
