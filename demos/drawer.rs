//! Headless walk-through of a left drawer: a committed open, a dragged close
//! that is released early, and a drag interrupted by backgrounding.
//!
//! Run with `RUST_LOG=debug cargo run --example drawer`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use slideover::lifecycle;
use slideover::prelude::*;

struct Drawer;

impl TransitionControllerDelegate for Drawer {
    fn did_present(&self, controller: &TransitionController) {
        log::info!("{:?} drawer is open", controller.side());
    }

    fn did_dismiss(&self, controller: &TransitionController) {
        log::info!("{:?} drawer is closed", controller.side());
    }
}

fn run(driver: &TimedDriver) {
    while driver.tick(Duration::from_millis(16)) {
        let frame = driver.frame();
        log::info!("  x = {:>7.2} (visible {:.2})", frame.x, driver.position());
    }
}

fn drag(controller: &TransitionController, slot: &Rc<RefCell<Option<Rc<TimedDriver>>>>) {
    controller.set_interactive(true);
    let Some(driver) = controller.animation_controller_for_dismissed() else {
        return;
    };
    let Some(gesture) = controller.interaction_controller_for_dismissal(&driver) else {
        return;
    };
    controller.transition(TransitionOptions::dismiss().interactive(true), None, None);

    for step in 1..=4 {
        gesture.update(step as f32 * 0.1);
    }
    log::info!("released at {:.1}", gesture.progress());
    gesture.cancel();
    if let Some(driver) = slot.borrow().clone() {
        run(&driver);
    }
}

fn main() {
    env_logger::init();

    let config = MenuConfig::for_screen(390.0, 844.0);
    if let Err(err) = config.validate() {
        log::error!("invalid menu configuration: {}", err);
        return;
    }

    let slot = Rc::new(RefCell::new(None));
    let controller = TransitionController::new(
        TransitionSide::Left,
        config,
        TimedDriver::tracking_factory(slot.clone()),
    );
    let drawer = Rc::new(Drawer);
    controller.set_delegate(&drawer);

    log::info!("opening");
    controller.present(true);
    let Some(driver) = slot.borrow().clone() else {
        return;
    };
    driver.resize(390.0);
    run(&driver);

    log::info!("dragging closed, released early");
    drag(&controller, &slot);

    log::info!("dragging closed, then the app is backgrounded");
    controller.set_interactive(true);
    let gesture = controller
        .animation_controller_for_dismissed()
        .and_then(|handle| controller.interaction_controller_for_dismissal(&handle));
    if let Some(gesture) = gesture {
        controller.transition(TransitionOptions::dismiss().interactive(true), None, None);
        gesture.update(0.6);
        lifecycle::post(LifecycleEvent::DidEnterBackground);
        log::info!("gesture is now {:?}", gesture.state());
        run(&driver);
    }

    log::info!("closing");
    controller.dismiss(true);
    run(&driver);
}
