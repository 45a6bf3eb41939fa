/// Payload-less "the watched tree changed" pulse.
///
/// Triggers carry no identity: only their occurrence and order matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger;
