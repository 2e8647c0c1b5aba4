use rollup_node_primitives::LogFilter;

/// A stream of base chain events a handler can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchTarget {
    /// Every block.
    Blocks,
    /// The logs matching the filter.
    Logs(LogFilter),
}

impl WatchTarget {
    /// Returns the identifier of the subscription, which keys the persisted cursor.
    pub fn subscription_id(&self) -> String {
        match self {
            Self::Blocks => "blocks".to_string(),
            Self::Logs(filter) => format!("logs:{filter}"),
        }
    }
}

impl core::fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.subscription_id())
    }
}
