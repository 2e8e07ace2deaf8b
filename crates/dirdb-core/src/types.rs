//! Small shared enums: modify flags, request operation codes, and the
//! capability set a backend implementation exposes.

/// The kind of change a modify element carries (§4.F Modify).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModFlag {
    /// Append values to the attribute (create it if absent).
    Add,
    /// Replace all existing values for the attribute.
    Replace,
    /// Remove the whole attribute, or specific values from it.
    Delete,
}

impl ModFlag {
    /// Decode a modify flag from its wire code. Any other code is a
    /// protocol error at the call site (§4.F: "Any other flag yields
    /// `PROTOCOL_ERROR`").
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ModFlag::Add),
            1 => Some(ModFlag::Delete),
            2 => Some(ModFlag::Replace),
            _ => None,
        }
    }
}

/// Request operation codes recognised by the Request Adapter (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationCode {
    /// Add a new entry.
    Add,
    /// Modify an existing entry.
    Modify,
    /// Delete an entry.
    Delete,
    /// Rename (and optionally move) an entry.
    Rename,
    /// Search — delegated entirely outside the core engine.
    Search,
    /// Report the current/next sequence number.
    SequenceNumber,
    /// Begin a transaction.
    StartTransaction,
    /// Commit a transaction.
    EndTransaction,
    /// Cancel (roll back) a transaction.
    CancelTransaction,
}

/// The set of operations a backend module chain implements, modeled as a
/// capability set rather than the dynamic-dispatch module chain of the
/// teacher's original architecture (§9 design notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Bitmask; see the `CAP_*` constants.
    bits: u16,
}

/// Capability bit: the backend answers `search` requests (delegated; the
/// write-path engine itself never sets this since search lives outside
/// the core).
pub const CAP_SEARCH: u16 = 1 << 0;
/// Capability bit: `add`.
pub const CAP_ADD: u16 = 1 << 1;
/// Capability bit: `modify`.
pub const CAP_MODIFY: u16 = 1 << 2;
/// Capability bit: `delete`.
pub const CAP_DELETE: u16 = 1 << 3;
/// Capability bit: `rename`.
pub const CAP_RENAME: u16 = 1 << 4;
/// Capability bit: `start_transaction`.
pub const CAP_START_TXN: u16 = 1 << 5;
/// Capability bit: `end_transaction`.
pub const CAP_END_TXN: u16 = 1 << 6;
/// Capability bit: `cancel_transaction`.
pub const CAP_CANCEL_TXN: u16 = 1 << 7;
/// Capability bit: `sequence_number`.
pub const CAP_SEQUENCE_NUMBER: u16 = 1 << 8;

/// All capabilities the write-path/sequence engine implements (everything
/// except `search`, which is delegated).
pub const ENGINE_CAPABILITIES: u16 = CAP_ADD
    | CAP_MODIFY
    | CAP_DELETE
    | CAP_RENAME
    | CAP_START_TXN
    | CAP_END_TXN
    | CAP_CANCEL_TXN
    | CAP_SEQUENCE_NUMBER;

impl Capabilities {
    /// Build a capability set from a raw bitmask.
    pub fn from_bits(bits: u16) -> Self {
        Capabilities { bits }
    }

    /// Whether the given capability bit is set.
    pub fn supports(&self, bit: u16) -> bool {
        self.bits & bit != 0
    }
}

impl OperationCode {
    /// The capability bit required to dispatch this operation.
    pub fn required_capability(&self) -> u16 {
        match self {
            OperationCode::Search => CAP_SEARCH,
            OperationCode::Add => CAP_ADD,
            OperationCode::Modify => CAP_MODIFY,
            OperationCode::Delete => CAP_DELETE,
            OperationCode::Rename => CAP_RENAME,
            OperationCode::SequenceNumber => CAP_SEQUENCE_NUMBER,
            OperationCode::StartTransaction => CAP_START_TXN,
            OperationCode::EndTransaction => CAP_END_TXN,
            OperationCode::CancelTransaction => CAP_CANCEL_TXN,
        }
    }
}
