use crate::config::HostConfig;

/// Lifecycle hooks a hosted minigame implements.
///
/// Construction is the init step. `cleanup` is called exactly once by the
/// [`Host`], either explicitly or when the host is dropped.
pub trait Minigame {
    /// Called at the fixed rate of [`HostConfig::fixed_step`].
    fn fixed_loop(&mut self, _dt: f32) {}

    /// Called once per displayed frame with the elapsed wall time.
    fn frame(&mut self, dt: f32);

    fn cleanup(&mut self);
}

/// Drives a [`Minigame`]: fixed-rate steps from an accumulator, then one
/// variable-rate frame.
#[derive(Debug)]
pub struct Host<G: Minigame> {
    game: G,
    config: HostConfig,
    accumulator: f32,
    fixed_steps: u64,
    cleaned_up: bool,
}

impl<G: Minigame> Host<G> {
    pub fn new(game: G, config: HostConfig) -> Self {
        Self {
            game,
            config,
            accumulator: 0.0,
            fixed_steps: 0,
            cleaned_up: false,
        }
    }

    /// Advance by `dt` seconds of wall time.
    pub fn tick(&mut self, dt: f32) {
        if self.cleaned_up {
            return;
        }
        let step = self.config.fixed_step;
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= step && steps < self.config.max_steps_per_frame {
            self.game.fixed_loop(step);
            self.accumulator -= step;
            steps += 1;
        }
        if steps == self.config.max_steps_per_frame && self.accumulator >= step {
            tracing::debug!(dropped = self.accumulator, "fixed step backlog dropped");
            self.accumulator = 0.0;
        }
        self.fixed_steps += steps as u64;
        self.game.frame(dt);
    }

    /// Run the game's cleanup if it has not run yet.
    pub fn shutdown(&mut self) {
        if !self.cleaned_up {
            self.cleaned_up = true;
            self.game.cleanup();
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn fixed_steps(&self) -> u64 {
        self.fixed_steps
    }

    pub fn is_shut_down(&self) -> bool {
        self.cleaned_up
    }
}

impl<G: Minigame> Drop for Host<G> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        fixed: Vec<f32>,
        frames: Vec<f32>,
        cleanups: u32,
    }

    struct Probe(Rc<RefCell<Log>>);

    impl Minigame for Probe {
        fn fixed_loop(&mut self, dt: f32) {
            self.0.borrow_mut().fixed.push(dt);
        }

        fn frame(&mut self, dt: f32) {
            self.0.borrow_mut().frames.push(dt);
        }

        fn cleanup(&mut self) {
            self.0.borrow_mut().cleanups += 1;
        }
    }

    fn host(config: HostConfig) -> (Host<Probe>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        (Host::new(Probe(log.clone()), config), log)
    }

    fn config(step: f32, max: u32) -> HostConfig {
        HostConfig {
            fixed_step: step,
            max_steps_per_frame: max,
        }
    }

    #[test]
    fn fixed_steps_accumulate() {
        let (mut host, log) = host(config(0.25, 8));
        host.tick(0.1);
        host.tick(0.1);
        assert!(log.borrow().fixed.is_empty());
        host.tick(0.1);
        assert_eq!(log.borrow().fixed, vec![0.25]);
        host.tick(0.5);
        assert_eq!(host.fixed_steps(), 3);
        assert_eq!(log.borrow().frames.len(), 4);
    }

    #[test]
    fn backlog_is_capped() {
        let (mut host, log) = host(config(0.25, 2));
        host.tick(10.0);
        assert_eq!(log.borrow().fixed.len(), 2);
        host.tick(0.0);
        assert_eq!(log.borrow().fixed.len(), 2);
    }

    #[test]
    fn cleanup_runs_exactly_once() {
        let (mut host, log) = host(HostConfig::default());
        host.tick(0.016);
        host.shutdown();
        host.shutdown();
        host.tick(0.016);
        assert_eq!(log.borrow().frames.len(), 1);
        drop(host);
        assert_eq!(log.borrow().cleanups, 1);
    }

    #[test]
    fn drop_cleans_up() {
        let (host, log) = host(HostConfig::default());
        drop(host);
        assert_eq!(log.borrow().cleanups, 1);
    }
}
