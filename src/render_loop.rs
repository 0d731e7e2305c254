use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

/// One-shot callbacks for the next display refresh. Each request fires at most once;
/// cancelled or superseded requests never come back out of `take_due`.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Vec<FrameRequest>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending.push(request);
        request
    }

    pub fn cancel(&mut self, request: FrameRequest) {
        self.pending.retain(|pending| *pending != request);
    }

    /// Drains the requests that should run on this refresh.
    pub fn take_due(&mut self) -> Vec<FrameRequest> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Self-rescheduling frame loop. Suspended until `resume`; while running it keeps
/// exactly one outstanding frame request.
#[derive(Debug)]
pub struct RenderLoop {
    interval: f64,
    previous: Option<f64>,
    pending: Option<FrameRequest>,
}

impl RenderLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.as_secs_f64(),
            previous: None,
            pending: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn resume(&mut self, frames: &mut FrameQueue) {
        if self.pending.is_some() {
            return;
        }
        self.pending = Some(frames.request());
    }

    pub fn suspend(&mut self, frames: &mut FrameQueue) {
        if let Some(request) = self.pending.take() {
            frames.cancel(request);
        }
    }

    /// Handles a due frame. Requests this loop no longer owns are dropped without
    /// rescheduling. Returns whether `callback` ran.
    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        timestamp: f64,
        frames: &mut FrameQueue,
        callback: impl FnOnce(),
    ) -> bool {
        if self.pending != Some(request) {
            return false;
        }
        let due = self
            .previous
            .is_none_or(|previous| timestamp - previous >= self.interval);
        if due {
            self.previous = Some(timestamp);
            callback();
        }
        self.pending = Some(frames.request());
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frame(render_loop: &mut RenderLoop, frames: &mut FrameQueue, now: f64) -> usize {
        let mut fired = 0;
        for request in frames.take_due() {
            render_loop.on_frame(request, now, frames, || fired += 1);
        }
        fired
    }

    #[test]
    fn starts_suspended() {
        let mut frames = FrameQueue::new();
        let mut render_loop = RenderLoop::new(Duration::ZERO);
        assert!(!render_loop.is_running());
        assert_eq!(run_frame(&mut render_loop, &mut frames, 0.0), 0);
    }

    #[test]
    fn zero_interval_fires_every_frame() {
        let mut frames = FrameQueue::new();
        let mut render_loop = RenderLoop::new(Duration::ZERO);
        render_loop.resume(&mut frames);
        for frame in 0..5 {
            assert_eq!(run_frame(&mut render_loop, &mut frames, frame as f64 / 60.0), 1);
            assert_eq!(frames.pending(), 1);
        }
    }

    #[test]
    fn interval_throttles_but_keeps_rescheduling() {
        let mut frames = FrameQueue::new();
        let mut render_loop = RenderLoop::new(Duration::from_millis(50));
        render_loop.resume(&mut frames);
        let fired: usize = (0..10)
            .map(|frame| run_frame(&mut render_loop, &mut frames, frame as f64 * 0.02))
            .sum();
        // Fires at 0.00, 0.06, 0.12, 0.18.
        assert_eq!(fired, 4);
        assert!(render_loop.is_running());
    }

    #[test]
    fn double_suspend_is_safe() {
        let mut frames = FrameQueue::new();
        let mut render_loop = RenderLoop::new(Duration::ZERO);
        render_loop.resume(&mut frames);
        render_loop.suspend(&mut frames);
        render_loop.suspend(&mut frames);
        assert!(!render_loop.is_running());
        assert_eq!(frames.pending(), 0);
        assert_eq!(run_frame(&mut render_loop, &mut frames, 1.0), 0);
    }

    #[test]
    fn resume_after_suspend_starts_a_single_chain() {
        let mut frames = FrameQueue::new();
        let mut render_loop = RenderLoop::new(Duration::ZERO);
        render_loop.resume(&mut frames);
        render_loop.suspend(&mut frames);
        render_loop.resume(&mut frames);
        render_loop.resume(&mut frames);
        assert_eq!(frames.pending(), 1);
        for frame in 0..3 {
            assert_eq!(run_frame(&mut render_loop, &mut frames, frame as f64), 1);
            assert_eq!(frames.pending(), 1);
        }
    }

    #[test]
    fn suspend_after_frame_was_drained_drops_it() {
        let mut frames = FrameQueue::new();
        let mut render_loop = RenderLoop::new(Duration::ZERO);
        render_loop.resume(&mut frames);
        let due = frames.take_due();
        render_loop.suspend(&mut frames);
        let mut fired = false;
        for request in due {
            assert!(!render_loop.on_frame(request, 0.0, &mut frames, || fired = true));
        }
        assert!(!fired);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn stale_request_after_resume_is_ignored() {
        let mut frames = FrameQueue::new();
        let mut render_loop = RenderLoop::new(Duration::ZERO);
        render_loop.resume(&mut frames);
        let stale = frames.take_due();
        render_loop.suspend(&mut frames);
        render_loop.resume(&mut frames);
        for request in stale {
            assert!(!render_loop.on_frame(request, 0.0, &mut frames, || {}));
        }
        assert_eq!(frames.pending(), 1);
        assert_eq!(run_frame(&mut render_loop, &mut frames, 0.0), 1);
    }
}
