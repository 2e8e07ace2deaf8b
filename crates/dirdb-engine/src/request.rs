//! Request Adapter (§4.I)
//!
//! Translates an inbound request record into a call on the write path or
//! the sequence component, and routes the result through the caller's
//! continuation. Scheduling is single-threaded and synchronous (§5): there
//! is no internal event loop, so "pending" is visited only for the
//! duration of `dispatch`'s own stack frame.

use crate::write_path::Engine;
use dirdb_core::types::{Capabilities, OperationCode, ENGINE_CAPABILITIES};
use dirdb_core::{Dn, Element, Entry, Error, Result};

/// Lifecycle of one inbound request's handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Init,
    Pending,
    Done,
}

/// A request control. Only `critical` is interpreted at this layer: an
/// unrecognised critical control is rejected outright (§4.I, §6). No
/// control OIDs are recognised by the core engine today, so any control
/// marked critical fails dispatch.
#[derive(Debug, Clone)]
pub struct Control {
    pub oid: String,
    pub critical: bool,
}

/// One inbound request. Only the fields relevant to `operation` need be
/// populated; the adapter reports a protocol error for a missing one
/// rather than panicking.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub operation: Option<OperationCode>,
    pub dn: Option<Dn>,
    pub new_dn: Option<Dn>,
    pub entry: Option<Entry>,
    pub mods: Option<Vec<Element>>,
    pub controls: Vec<Control>,
}

impl Request {
    pub fn new(operation: OperationCode) -> Self {
        Request {
            operation: Some(operation),
            ..Default::default()
        }
    }

    pub fn with_dn(mut self, dn: Dn) -> Self {
        self.dn = Some(dn);
        self
    }

    pub fn with_new_dn(mut self, dn: Dn) -> Self {
        self.new_dn = Some(dn);
        self
    }

    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn with_mods(mut self, mods: Vec<Element>) -> Self {
        self.mods = Some(mods);
        self
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }
}

/// What a request returns on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseValue {
    Unit,
    SequenceNumber(u64),
}

/// The outcome handed to the caller's continuation, carrying both the
/// final handle state (always `Done` by the time a continuation sees it)
/// and the dispatch result.
#[derive(Debug)]
pub struct Response {
    pub state: HandleState,
    pub result: Result<ResponseValue>,
}

/// Translates requests into write-path/sequence calls on a borrowed
/// [`Engine`]. One adapter per database handle, matching the engine's own
/// single-threaded-per-handle scheduling (§5).
pub struct Adapter {
    engine: Engine,
}

impl Adapter {
    pub fn new(engine: Engine) -> Self {
        Adapter { engine }
    }

    /// The capability set this adapter's engine answers for (§9: modeled
    /// as a capability set rather than a dynamic module chain). Search is
    /// excluded; it is delegated entirely outside the core.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::from_bits(ENGINE_CAPABILITIES)
    }

    /// Borrow the underlying engine, e.g. to inspect `metadata` between
    /// requests.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Dispatch one request. The handle moves `Init` → `Pending` →
    /// `Done` regardless of outcome; `continuation`, if supplied, is
    /// invoked exactly once with the final response before this call
    /// returns (§4.I, §9: continuations collapse to a synchronous sink).
    pub fn dispatch(
        &mut self,
        request: Request,
        continuation: Option<Box<dyn FnOnce(&Response)>>,
    ) -> Response {
        // Init -> Pending is implicit: there is no internal await point to
        // observe it at (§5), so the state only becomes visible to a
        // caller once it reaches Done below.
        let result = match self.reject_unrecognised_controls(&request) {
            Err(err) => Err(err),
            Ok(()) => self.perform(&request),
        };

        let response = Response {
            state: HandleState::Done,
            result,
        };
        if let Some(sink) = continuation {
            sink(&response);
        }
        response
    }

    fn reject_unrecognised_controls(&self, request: &Request) -> Result<()> {
        for control in &request.controls {
            if control.critical && !Self::control_recognised(&control.oid) {
                return Err(Error::UnsupportedCriticalExtension(control.oid.clone()));
            }
        }
        Ok(())
    }

    /// The core engine recognises no request controls of its own; every
    /// control it might be asked to honour is implemented by an outer
    /// layer (search, request-dispatch skeleton), both out of scope here.
    fn control_recognised(_oid: &str) -> bool {
        false
    }

    fn perform(&mut self, request: &Request) -> Result<ResponseValue> {
        let operation = request
            .operation
            .ok_or_else(|| Error::Protocol("request missing operation code".to_string()))?;

        if !self
            .capabilities()
            .supports(operation.required_capability())
        {
            return Err(Error::Operations(format!(
                "{operation:?} is not implemented by this engine"
            )));
        }

        match operation {
            OperationCode::Add => {
                let entry = request
                    .entry
                    .clone()
                    .ok_or_else(|| Error::Protocol("add request missing entry".to_string()))?;
                self.engine.add(entry)?;
                Ok(ResponseValue::Unit)
            }
            OperationCode::Modify => {
                let dn = request
                    .dn
                    .clone()
                    .ok_or_else(|| Error::Protocol("modify request missing dn".to_string()))?;
                let mods = request
                    .mods
                    .clone()
                    .ok_or_else(|| Error::Protocol("modify request missing mods".to_string()))?;
                self.engine.modify(&dn, mods)?;
                Ok(ResponseValue::Unit)
            }
            OperationCode::Delete => {
                let dn = request
                    .dn
                    .clone()
                    .ok_or_else(|| Error::Protocol("delete request missing dn".to_string()))?;
                self.engine.delete(&dn)?;
                Ok(ResponseValue::Unit)
            }
            OperationCode::Rename => {
                let old = request
                    .dn
                    .clone()
                    .ok_or_else(|| Error::Protocol("rename request missing dn".to_string()))?;
                let new = request
                    .new_dn
                    .clone()
                    .ok_or_else(|| Error::Protocol("rename request missing new_dn".to_string()))?;
                self.engine.rename(&old, &new)?;
                Ok(ResponseValue::Unit)
            }
            OperationCode::SequenceNumber => {
                Ok(ResponseValue::SequenceNumber(self.engine.sequence_number()?))
            }
            OperationCode::StartTransaction => {
                self.engine.start_transaction()?;
                Ok(ResponseValue::Unit)
            }
            OperationCode::EndTransaction => {
                self.engine.end_transaction()?;
                Ok(ResponseValue::Unit)
            }
            OperationCode::CancelTransaction => {
                self.engine.cancel_transaction()?;
                Ok(ResponseValue::Unit)
            }
            OperationCode::Search => {
                Err(Error::Operations("search is delegated outside the core engine".to_string()))
            }
        }
    }
}
