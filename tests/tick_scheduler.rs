// Real-time tick scheduling, driven with tokio's paused clock.

mod common;

use std::time::Duration;
use tickforge::console::Submission;
use tickforge::engine::{ActionMode, ScheduledAction, StopFlag, TickFlow, TickScheduler, TimedAction};
use tickforge::shell::Shell;
use tickforge::world::GameContext;
use tokio::time::Instant;

struct Countdown {
    left: u32,
    stop: StopFlag,
}

impl TimedAction for Countdown {
    fn tick(&mut self, _ctx: &mut GameContext) -> TickFlow {
        if self.stop.is_raised() || self.left == 0 {
            return TickFlow::Finish;
        }
        self.left -= 1;
        TickFlow::Continue
    }
}

fn countdown(ctx: &mut GameContext, left: u32, stop: StopFlag) -> ScheduledAction {
    let handle = ctx.new_handle("countdown", stop.clone(), "Stopped counting.");
    assert!(ctx.begin(
        handle,
        ActionMode::Foreground,
        0.0,
        Box::new(Countdown { left, stop })
    ));
    ctx.take_pending().remove(0)
}

#[tokio::test(start_paused = true)]
async fn one_tick_per_period() {
    let config = common::test_config();
    let mut ctx = common::test_context(&config);
    let action = countdown(&mut ctx, 2, StopFlag::new());
    let shared = ctx.into_shared();

    let scheduler = TickScheduler::new(Duration::from_secs(1));
    let start = Instant::now();
    let ticks = scheduler.spawn(shared.clone(), action).await.unwrap();
    assert_eq!(ticks, 3);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert!(!shared.lock().await.lock.is_locked());
}

#[tokio::test(start_paused = true)]
async fn stop_waits_for_the_next_boundary() {
    let config = common::test_config();
    let mut ctx = common::test_context(&config);
    let stop = StopFlag::new();
    let action = countdown(&mut ctx, 100, stop.clone());
    let shared = ctx.into_shared();

    let scheduler = TickScheduler::new(Duration::from_secs(1));
    let start = Instant::now();
    let task = scheduler.spawn(shared.clone(), action);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    {
        let mut guard = shared.lock().await;
        let guard = &mut *guard;
        assert!(guard.lock.stop_holder(&mut guard.console));
    }
    let ticks = task.await.unwrap();
    assert_eq!(ticks, 3);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn world_clock_regenerates_to_max() {
    let mut config = common::test_config();
    config.player.stamina = 95.0;
    config.world.power_regen = 2.0;
    let shared = common::test_context(&config).into_shared();
    let clock = TickScheduler::new(Duration::from_secs(1)).spawn_world_clock(shared.clone());

    tokio::time::sleep(Duration::from_millis(3500)).await;
    {
        let guard = shared.lock().await;
        assert_eq!(guard.player.stamina, 98.0);
        assert_eq!(guard.power.stored, 6.0);
    }
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(shared.lock().await.player.stamina, 100.0);
    clock.abort();
}

#[tokio::test(start_paused = true)]
async fn gathering_until_stamina_runs_out() {
    let mut config = common::test_config();
    config.player.stamina = 3.0;
    let mut shell = Shell::new(&config, common::catalog()).unwrap();
    assert_eq!(shell.submit("gather").await, Submission::Dispatched);
    assert_eq!(shell.submit("status").await, Submission::Busy);

    let start = Instant::now();
    while shell.running_actions() > 0 {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    // three tries, then the fourth tick notices the empty pool
    assert!(start.elapsed() >= Duration::from_secs(4));
    assert!(start.elapsed() < Duration::from_secs(5));

    let ctx = shell.context();
    let guard = ctx.lock().await;
    assert_eq!(guard.player.stamina, 0.0);
    assert!(!guard.lock.is_locked());
    assert_eq!(guard.player.stamina_change, config.player.stamina_regen);
    assert_eq!(
        guard.console.last().unwrap().text,
        "Stopped gathering items because you ran out of stamina."
    );
}
