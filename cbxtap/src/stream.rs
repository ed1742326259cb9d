//! Stream module declares the resource streams this tap extracts.

/// Static definition of one extractable resource stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDef {
    /// Stream name as emitted on the output stream.
    pub name: &'static str,
    /// Records endpoint path, relative to the API base URL.
    pub path: &'static str,
    /// Target identifier used when deriving the stream's schema.
    pub target: &'static str,
    /// Primary key fields.
    pub key_properties: &'static [&'static str],
    /// Field whose highest observed value becomes the stream bookmark.
    pub replication_key: &'static str,
}

/// All streams served by the tap, in emission order.
pub const STREAMS: &[StreamDef] = &[
    StreamDef {
        name: "accounts",
        path: "/targets/accounts",
        target: "accounts",
        key_properties: &["id"],
        replication_key: "updatedAt",
    },
    StreamDef {
        name: "contacts",
        path: "/targets/contacts",
        target: "contacts",
        key_properties: &["id"],
        replication_key: "updatedAt",
    },
];

/// Looks up a stream definition by name.
pub fn stream_by_name(name: &str) -> Option<&'static StreamDef> {
    STREAMS.iter().find(|def| def.name == name)
}
