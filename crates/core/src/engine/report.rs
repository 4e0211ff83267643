use crate::decode::DecodeError;
use crate::sequence::AdvanceError;
use bt_protocol::step_models::StepSnapshot;

/// What happened during one engine cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub frame: u64,

    /// Payloads popped from the queue.
    pub polled: usize,

    /// Decoded events accepted by the sequence.
    pub applied: usize,

    pub decode_failures: Vec<DecodeError>,

    /// Decoded events the sequence rejected, in arrival order.
    pub rejected: Vec<AdvanceError>,

    /// Set when polling the queue failed.
    pub transport_error: Option<String>,

    /// Status of every step at the end of the cycle.
    pub snapshot: Vec<StepSnapshot>,
}

impl CycleReport {
    pub fn new(frame: u64) -> Self {
        Self {
            frame,
            polled: 0,
            applied: 0,
            decode_failures: Vec::new(),
            rejected: Vec::new(),
            transport_error: None,
            snapshot: Vec::new(),
        }
    }

    /// No decode failures, rejections or transport errors.
    pub fn is_clean(&self) -> bool {
        self.decode_failures.is_empty() && self.rejected.is_empty() && self.transport_error.is_none()
    }
}
