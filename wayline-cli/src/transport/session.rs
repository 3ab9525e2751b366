/// Lifecycle of the external messaging session.
///
/// The bridge process owns the real session; we mirror it as an explicit
/// state value driven by bridge events. The dispatch path only ever asks
/// "ready or not"; everything else is operator-facing logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Bridge spawned, no state reported yet.
    #[default]
    Uninitialized,
    /// Bridge is waiting for the user to scan the pairing code.
    AwaitingPairing,
    /// Session established; deliveries may proceed.
    Ready,
    /// Session lost; deliveries are skipped until the bridge recovers it.
    Disconnected,
}

impl SessionState {
    /// True only in [`SessionState::Ready`].
    pub fn is_ready(self) -> bool {
        matches!(self, SessionState::Ready)
    }
}
