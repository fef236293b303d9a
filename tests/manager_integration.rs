//! Behavior manager integration tests

use std::cell::Cell;
use std::rc::Rc;

use behavior_arbiter::behavior::{Behavior, BehaviorCore, ScriptedBehavior};
use behavior_arbiter::chooser::{BehaviorChooser, ChooserContext};
use behavior_arbiter::core::clock::ManualClock;
use behavior_arbiter::core::config::{
    BehaviorConfig, BehaviorKind, ChooserConfig, ConditionConfig, ManagerConfig, ReactionTriggerConfig,
};
use behavior_arbiter::event::{EventBus, EventPayload, EventTag, HostMessage, RobotEvent};
use behavior_arbiter::manager::TransitionRecorder;
use behavior_arbiter::{ArbiterError, BehaviorId, BehaviorManager, ChooserSlot, Robot};

fn robot_with(config: &ManagerConfig) -> (Robot, ManualClock, TransitionRecorder) {
    let clock = ManualClock::new();
    let mut robot = Robot::new(Rc::new(clock.clone()));
    let recorder = TransitionRecorder::new();
    robot.manager_mut().add_transition_sink(Box::new(recorder.clone()));
    robot.init(config).unwrap();
    (robot, clock, recorder)
}

fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
}

fn id(robot: &Robot, name: &str) -> BehaviorId {
    robot.manager().find_behavior(name).unwrap()
}

fn behavior<'a>(robot: &'a Robot, name: &str) -> &'a dyn Behavior {
    robot.manager().registry().get(id(robot, name)).unwrap()
}

/// `walk` runs until stopped and is the selection default; `flinch` reacts to cliffs
fn walk_and_flinch(flinch_resumes: bool) -> ManagerConfig {
    ManagerConfig {
        behaviors: vec![
            BehaviorConfig::scripted("walk", None),
            BehaviorConfig::scripted("flinch", Some(2)).reacting_to(vec![EventTag::CliffDetected], flinch_resumes),
            BehaviorConfig::scripted("struggle", Some(1)).reacting_to(vec![EventTag::RobotPickedUp], true),
        ],
        selection_chooser_config: Some(ChooserConfig::Selection {
            default_behavior: Some("walk".into()),
        }),
        ..Default::default()
    }
}

struct CountingChooser {
    target: Option<BehaviorId>,
    asked: Rc<Cell<u32>>,
    selected: Rc<Cell<u32>>,
    deselected: Rc<Cell<u32>>,
}

impl CountingChooser {
    fn new(target: Option<BehaviorId>) -> Self {
        Self {
            target,
            asked: Rc::new(Cell::new(0)),
            selected: Rc::new(Cell::new(0)),
            deselected: Rc::new(Cell::new(0)),
        }
    }
}

impl BehaviorChooser for CountingChooser {
    fn name(&self) -> &str {
        "counting"
    }

    fn on_selected(&mut self, _ctx: &mut ChooserContext) {
        self.selected.set(self.selected.get() + 1);
    }

    fn on_deselected(&mut self, _ctx: &mut ChooserContext) {
        self.deselected.set(self.deselected.get() + 1);
    }

    fn choose_next_behavior(&mut self, _ctx: &mut ChooserContext) -> Option<BehaviorId> {
        self.asked.set(self.asked.get() + 1);
        self.target
    }
}

#[test]
fn test_chooser_reasked_after_completion() {
    let clock = ManualClock::new();
    let mut robot = Robot::new(Rc::new(clock.clone()));
    let recorder = TransitionRecorder::new();
    robot.manager_mut().add_transition_sink(Box::new(recorder.clone()));

    let b = robot
        .manager_mut()
        .add_behavior(Box::new(ScriptedBehavior::new(BehaviorCore::new("b"), Some(2), "complete")))
        .unwrap();
    let chooser = CountingChooser::new(Some(b));
    let asked = Rc::clone(&chooser.asked);
    robot.manager_mut().install_chooser(ChooserSlot::Selection, Box::new(chooser));

    robot.init(&ManagerConfig::default()).unwrap();
    assert_eq!(recorder.pairs(), pairs(&[("null", "b")]));
    assert_eq!(behavior(&robot, "b").stats().init_calls, 1);

    robot.tick().unwrap();
    assert!(behavior(&robot, "b").is_running());
    assert_eq!(recorder.len(), 1);

    // Second update completes; the manager drops to none
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior(), None);
    assert_eq!(recorder.pairs(), pairs(&[("null", "b"), ("b", "null")]));

    let asked_before = asked.get();
    robot.tick().unwrap();
    assert_eq!(asked.get(), asked_before + 1);
    assert_eq!(robot.manager().current_behavior_name(), "b");
    assert_eq!(behavior(&robot, "b").stats().init_calls, 2);
    assert_eq!(robot.manager().session().behavior("b").completions, 1);
}

#[test]
fn test_reaction_preempts_and_resumes() {
    let (mut robot, _, recorder) = robot_with(&walk_and_flinch(true));
    let walk = id(&robot, "walk");
    robot.tick().unwrap();

    robot.publish(RobotEvent::new(EventTag::CliffDetected));
    assert_eq!(robot.manager().current_behavior_name(), "flinch");
    assert_eq!(robot.manager().behavior_to_resume(), Some(walk));
    assert!(robot.manager().is_running_reactionary());
    assert!(!behavior(&robot, "walk").is_running());

    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "flinch");

    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "walk");
    assert_eq!(robot.manager().behavior_to_resume(), None);
    assert!(!robot.manager().is_running_reactionary());

    let walk_stats = behavior(&robot, "walk").stats();
    assert_eq!(walk_stats.init_calls, 1);
    assert_eq!(walk_stats.resume_calls, 1);
    assert_eq!(
        recorder.pairs(),
        pairs(&[("null", "walk"), ("walk", "flinch"), ("flinch", "walk")])
    );

    let transitions = recorder.transitions();
    assert!(transitions[1].new_reactionary);
    assert!(transitions[2].old_reactionary);
}

#[test]
fn test_reaction_without_resume_drops_target() {
    let (mut robot, _, recorder) = robot_with(&walk_and_flinch(false));
    robot.tick().unwrap();

    robot.publish(RobotEvent::new(EventTag::CliffDetected));
    assert!(!robot.manager().should_resume_after_reaction());

    robot.tick().unwrap();
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior(), None);
    assert_eq!(robot.manager().behavior_to_resume(), None);
    assert_eq!(behavior(&robot, "walk").stats().resume_calls, 0);
    assert_eq!(
        recorder.pairs(),
        pairs(&[("null", "walk"), ("walk", "flinch"), ("flinch", "null")])
    );

    // The chooser picks walk again on the following tick, from scratch
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "walk");
    assert_eq!(behavior(&robot, "walk").stats().init_calls, 2);
}

#[test]
fn test_switch_to_current_is_noop() {
    let (mut robot, _, recorder) = robot_with(&walk_and_flinch(true));
    let walk = id(&robot, "walk");

    assert!(robot.manager_mut().switch_to_behavior(Some(walk)));
    assert_eq!(recorder.len(), 1);
    let stats = behavior(&robot, "walk").stats();
    assert_eq!(stats.init_calls, 1);
    assert_eq!(stats.stop_calls, 0);
}

#[test]
fn test_nested_reaction_keeps_original_target() {
    let mut config = walk_and_flinch(true);
    config.behaviors[1] =
        BehaviorConfig::scripted("flinch", Some(5)).reacting_to(vec![EventTag::CliffDetected], true);
    let (mut robot, _, recorder) = robot_with(&config);
    let walk = id(&robot, "walk");
    robot.tick().unwrap();

    robot.publish(RobotEvent::new(EventTag::CliffDetected));
    robot.tick().unwrap();
    robot.publish(RobotEvent::new(EventTag::RobotPickedUp));

    assert_eq!(robot.manager().current_behavior_name(), "struggle");
    assert_eq!(robot.manager().behavior_to_resume(), Some(walk));
    assert!(!behavior(&robot, "flinch").is_running());

    // struggle finishes in one tick and walk comes back without a fresh init
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "walk");
    assert_eq!(behavior(&robot, "walk").stats().init_calls, 1);
    assert_eq!(behavior(&robot, "walk").stats().resume_calls, 1);
    assert_eq!(
        recorder.pairs(),
        pairs(&[
            ("null", "walk"),
            ("walk", "flinch"),
            ("flinch", "struggle"),
            ("struggle", "walk"),
        ])
    );
    assert_eq!(robot.manager().session().reactions_fired, 2);
}

#[test]
fn test_nested_reaction_without_resume_wins() {
    let mut config = walk_and_flinch(true);
    config.behaviors[2] =
        BehaviorConfig::scripted("struggle", Some(1)).reacting_to(vec![EventTag::RobotPickedUp], false);
    let (mut robot, _, _) = robot_with(&config);
    robot.tick().unwrap();

    robot.publish(RobotEvent::new(EventTag::CliffDetected));
    robot.publish(RobotEvent::new(EventTag::RobotPickedUp));
    assert!(!robot.manager().should_resume_after_reaction());

    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior(), None);
    assert_eq!(behavior(&robot, "walk").stats().resume_calls, 0);
}

#[test]
fn test_chooser_switch_resets_reaction_state() {
    let (mut robot, _, _) = robot_with(&walk_and_flinch(true));
    robot.tick().unwrap();
    robot.publish(RobotEvent::new(EventTag::CliffDetected));
    assert!(robot.manager().is_running_reactionary());

    robot
        .handle_message(HostMessage::ActivateChooser {
            slot: ChooserSlot::Freeplay,
        })
        .unwrap();

    let manager = robot.manager();
    assert_eq!(manager.current_chooser(), Some(ChooserSlot::Freeplay));
    assert!(!manager.is_running_reactionary());
    assert_eq!(manager.behavior_to_resume(), None);
    assert!(manager.should_resume_after_reaction());
    // No freeplay chooser configured: the null chooser keeps the robot idle
    assert_eq!(manager.current_behavior(), None);
    assert!(manager.registry().running_ids().is_empty());
}

#[test]
fn test_set_same_chooser_is_idempotent() {
    let clock = ManualClock::new();
    let mut robot = Robot::new(Rc::new(clock));
    let chooser = CountingChooser::new(None);
    let selected = Rc::clone(&chooser.selected);
    let deselected = Rc::clone(&chooser.deselected);
    robot.manager_mut().install_chooser(ChooserSlot::Demo, Box::new(chooser));
    robot.init(&ManagerConfig::default()).unwrap();

    robot.manager_mut().set_behavior_chooser(ChooserSlot::Demo);
    robot.manager_mut().set_behavior_chooser(ChooserSlot::Demo);
    assert_eq!(selected.get(), 1);
    assert_eq!(deselected.get(), 0);

    robot.manager_mut().set_behavior_chooser(ChooserSlot::Selection);
    assert_eq!(selected.get(), 1);
    assert_eq!(deselected.get(), 1);
}

#[test]
fn test_chooser_switch_stamps_time() {
    let (mut robot, clock, _) = robot_with(&walk_and_flinch(true));
    clock.advance(4.5);
    robot.manager_mut().set_behavior_chooser(ChooserSlot::Demo);
    assert_eq!(robot.manager().last_chooser_switch_time(), 4.5);
}

#[test]
fn test_failed_init_falls_back_to_none() {
    let mut config = walk_and_flinch(true);
    config.behaviors.push(BehaviorConfig::new(
        "broken",
        BehaviorKind::Scripted {
            run_ticks: None,
            outcome: "complete".into(),
            fail_init: true,
            fail_resume: false,
        },
    ));
    let (mut robot, _, recorder) = robot_with(&config);
    let broken = id(&robot, "broken");

    assert!(!robot.manager_mut().switch_to_behavior(Some(broken)));
    assert_eq!(robot.manager().current_behavior(), None);
    assert_eq!(recorder.pairs(), pairs(&[("null", "walk"), ("walk", "null")]));
    assert_eq!(robot.manager().session().behavior("broken").init_failures, 1);

    // The manager keeps ticking and reselects
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "walk");
}

#[test]
fn test_failed_resume_reselects() {
    let mut config = walk_and_flinch(true);
    config.behaviors[0] = BehaviorConfig::new(
        "walk",
        BehaviorKind::Scripted {
            run_ticks: None,
            outcome: "complete".into(),
            fail_init: false,
            fail_resume: true,
        },
    );
    let (mut robot, _, recorder) = robot_with(&config);
    robot.tick().unwrap();
    robot.publish(RobotEvent::new(EventTag::CliffDetected));
    robot.tick().unwrap();
    robot.tick().unwrap();

    assert_eq!(robot.manager().behavior_to_resume(), None);
    assert_eq!(robot.manager().session().behavior("walk").resume_failures, 1);
    // Resume failed, so the chooser's answer is initialized instead
    assert_eq!(robot.manager().current_behavior_name(), "walk");
    assert_eq!(behavior(&robot, "walk").stats().init_calls, 2);
    assert_eq!(
        recorder.pairs(),
        pairs(&[
            ("null", "walk"),
            ("walk", "flinch"),
            ("flinch", "null"),
            ("null", "walk"),
        ])
    );
}

#[test]
fn test_double_init_rejected() {
    let config = walk_and_flinch(true);
    let (mut robot, _, _) = robot_with(&config);

    let err = robot.init(&config).unwrap_err();
    assert!(matches!(err, ArbiterError::AlreadyInitialized));
    assert!(err.is_programmer_error());
    assert_eq!(robot.manager().current_behavior_name(), "walk");
}

#[test]
fn test_update_before_init_fails() {
    let mut robot = Robot::new(Rc::new(ManualClock::new()));
    let err = robot.tick().unwrap_err();
    assert!(matches!(err, ArbiterError::NotInitialized));
    assert!(!robot.manager().is_initialized());
}

#[test]
fn test_unrecognized_status_reported() {
    let config = ManagerConfig {
        behaviors: vec![BehaviorConfig::new(
            "garbled",
            BehaviorKind::Scripted {
                run_ticks: Some(1),
                outcome: "exploded".into(),
                fail_init: false,
                fail_resume: false,
            },
        )],
        selection_chooser_config: Some(ChooserConfig::Selection {
            default_behavior: Some("garbled".into()),
        }),
        ..Default::default()
    };
    let (mut robot, _, _) = robot_with(&config);

    let err = robot.tick().unwrap_err();
    assert!(matches!(err, ArbiterError::UnrecognizedStatus { ref status, .. } if status == "exploded"));
    assert!(err.is_programmer_error());
    assert_eq!(robot.manager().current_behavior(), None);
    assert!(robot.manager().registry().running_ids().is_empty());

    // Not a crash: the next tick selects again
    let _ = robot.tick();
    assert!(robot.manager().is_initialized());
    assert_eq!(behavior(&robot, "garbled").stats().init_calls, 2);
}

#[test]
fn test_force_stop_clears_reaction() {
    let (mut robot, _, _) = robot_with(&walk_and_flinch(true));
    robot.tick().unwrap();
    robot.publish(RobotEvent::new(EventTag::CliffDetected));

    robot
        .handle_message(HostMessage::ForceStop {
            reason: "operator".into(),
        })
        .unwrap();
    assert_eq!(robot.manager().current_behavior(), None);
    assert!(!robot.manager().is_running_reactionary());
    assert_eq!(robot.manager().behavior_to_resume(), None);
    assert!(robot.manager().registry().running_ids().is_empty());

    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "walk");
    assert_eq!(behavior(&robot, "walk").stats().init_calls, 2);
}

#[test]
fn test_first_registered_reaction_wins() {
    let config = ManagerConfig {
        behaviors: vec![
            BehaviorConfig::wait("idle"),
            BehaviorConfig::wait("first").reacting_to(vec![EventTag::CliffDetected], true),
            BehaviorConfig::wait("second").reacting_to(vec![EventTag::CliffDetected], true),
        ],
        selection_chooser_config: Some(ChooserConfig::Selection {
            default_behavior: Some("idle".into()),
        }),
        ..Default::default()
    };
    let (mut robot, _, _) = robot_with(&config);

    robot.publish(RobotEvent::new(EventTag::CliffDetected));
    assert_eq!(robot.manager().current_behavior_name(), "first");

    // With the first locked out the scan moves on
    robot.manager_mut().force_stop_current_behavior("reset");
    assert!(robot
        .manager_mut()
        .request_enable_reactionary_behavior("test", "first", false));
    robot.publish(RobotEvent::new(EventTag::CliffDetected));
    assert_eq!(robot.manager().current_behavior_name(), "second");
}

#[test]
fn test_reaction_locks() {
    let (mut robot, _, _) = robot_with(&walk_and_flinch(true));
    robot.tick().unwrap();

    robot
        .handle_message(HostMessage::DisableAllReactions { lock: "ui".into() })
        .unwrap();
    robot.publish(RobotEvent::new(EventTag::CliffDetected));
    assert_eq!(robot.manager().current_behavior_name(), "walk");

    robot
        .handle_message(HostMessage::RemoveReactionsLock { lock: "ui".into() })
        .unwrap();
    robot
        .handle_message(HostMessage::EnableReactionaryBehavior {
            requester: "menu".into(),
            behavior_type: "flinch".into(),
            enable: false,
        })
        .unwrap();
    robot.publish(RobotEvent::new(EventTag::CliffDetected));
    assert_eq!(robot.manager().current_behavior_name(), "walk");
    assert!(!robot.manager().locks().is_type_enabled("flinch"));

    // Releasing a lock nobody holds is refused
    assert!(!robot
        .manager_mut()
        .request_enable_reactionary_behavior("someone_else", "flinch", true));
    assert!(robot
        .manager_mut()
        .request_enable_reactionary_behavior("menu", "flinch", true));

    robot.publish(RobotEvent::new(EventTag::CliffDetected));
    assert_eq!(robot.manager().current_behavior_name(), "flinch");
}

#[test]
fn test_event_filters() {
    let mut greet = BehaviorConfig::wait("greet").reacting_to(vec![EventTag::FaceObserved], true);
    if let Some(reaction) = greet.reaction.as_mut() {
        reaction.max_distance_mm = Some(500.0);
    }
    let mut startle = BehaviorConfig::wait("startle").reacting_to(vec![EventTag::UnexpectedMovement], true);
    startle.requires_on_treads = true;

    let config = ManagerConfig {
        behaviors: vec![BehaviorConfig::wait("idle"), greet, startle],
        selection_chooser_config: Some(ChooserConfig::Selection {
            default_behavior: Some("idle".into()),
        }),
        ..Default::default()
    };
    let (mut robot, _, _) = robot_with(&config);

    let face = |distance_mm| {
        RobotEvent::new(EventTag::FaceObserved).with_payload(EventPayload::Face {
            face_id: 1,
            name: None,
            distance_mm,
        })
    };

    robot.publish(face(900.0));
    assert_eq!(robot.manager().current_behavior_name(), "idle");
    robot.publish(face(300.0));
    assert_eq!(robot.manager().current_behavior_name(), "greet");

    robot.manager_mut().force_stop_current_behavior("reset");
    robot.tick().unwrap();
    robot.state_mut().on_treads = false;
    robot.publish(RobotEvent::new(EventTag::UnexpectedMovement));
    assert_eq!(robot.manager().current_behavior_name(), "idle");
}

fn recover_config(can_interrupt_self: bool, cooldown_secs: f64) -> ManagerConfig {
    ManagerConfig {
        behaviors: vec![
            BehaviorConfig::scripted("walk", None),
            BehaviorConfig::scripted("recover", Some(2)),
        ],
        selection_chooser_config: Some(ChooserConfig::Selection {
            default_behavior: Some("walk".into()),
        }),
        reaction_triggers: vec![ReactionTriggerConfig {
            behavior: "recover".into(),
            condition: ConditionConfig {
                metric: "tread_confidence".into(),
                max_confidence: 0.2,
                cooldown_secs,
            },
            resume_last: true,
            can_interrupt_self,
            can_interrupt_other: true,
        }],
        ..Default::default()
    }
}

#[test]
fn test_polled_strategy_respects_cooldown() {
    let (mut robot, clock, recorder) = robot_with(&recover_config(false, 10.0));
    robot.state_mut().set_metric("tread_confidence", 0.1);

    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "recover");
    assert!(robot.manager().is_running_reactionary());

    clock.advance(1.0);
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "walk");

    // Still below threshold, but cooling down since recover stopped at t=1
    clock.advance(1.0);
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "walk");

    clock.advance(10.0);
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "recover");
    assert_eq!(
        recorder.pairs(),
        pairs(&[
            ("null", "walk"),
            ("walk", "recover"),
            ("recover", "walk"),
            ("walk", "recover"),
        ])
    );
}

#[test]
fn test_polled_strategy_ignores_healthy_metric() {
    let (mut robot, _, _) = robot_with(&recover_config(false, 0.0));
    robot.tick().unwrap();
    robot.state_mut().set_metric("tread_confidence", 0.9);
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "walk");
}

#[test]
fn test_polled_strategy_restarts_itself() {
    let (mut robot, clock, recorder) = robot_with(&recover_config(true, 0.0));
    robot.state_mut().set_metric("tread_confidence", 0.1);

    for _ in 0..3 {
        robot.tick().unwrap();
        clock.advance(1.0);
    }

    assert_eq!(robot.manager().current_behavior_name(), "recover");
    assert_eq!(robot.manager().session().reactions_fired, 3);
    assert!(recorder
        .pairs()
        .contains(&("recover".to_string(), "recover".to_string())));
    assert_eq!(behavior(&robot, "recover").stats().init_calls, 3);
}

#[test]
fn test_polled_strategy_takes_over_chosen_behavior() {
    let mut config = recover_config(false, 10.0);
    config.selection_chooser_config = Some(ChooserConfig::Selection {
        default_behavior: Some("recover".into()),
    });
    let (mut robot, clock, recorder) = robot_with(&config);
    assert_eq!(robot.manager().current_behavior_name(), "recover");
    assert!(!robot.manager().is_running_reactionary());

    robot.state_mut().set_metric("tread_confidence", 0.1);
    robot.tick().unwrap();

    // The chosen run is restarted as a reaction with nothing to resume
    assert_eq!(robot.manager().current_behavior_name(), "recover");
    assert!(robot.manager().is_running_reactionary());
    assert_eq!(robot.manager().behavior_to_resume(), None);
    assert_eq!(robot.manager().session().reactions_fired, 1);
    assert_eq!(behavior(&robot, "recover").stats().init_calls, 2);

    // When the reaction ends the chooser picks again and gets a fresh run
    clock.advance(1.0);
    robot.tick().unwrap();
    assert!(!robot.manager().is_running_reactionary());
    assert_eq!(robot.manager().current_behavior_name(), "recover");
    assert_eq!(behavior(&robot, "recover").stats().init_calls, 3);
    assert_eq!(
        recorder.pairs(),
        pairs(&[
            ("null", "recover"),
            ("recover", "recover"),
            ("recover", "null"),
            ("null", "recover"),
        ])
    );

    // Cooling down from the end of the reaction, so the new run is left alone
    clock.advance(1.0);
    robot.tick().unwrap();
    assert!(!robot.manager().is_running_reactionary());
    assert_eq!(robot.manager().session().reactions_fired, 1);
}

#[test]
fn test_chosen_run_does_not_start_cooldown() {
    let (mut robot, _, _) = robot_with(&recover_config(false, 10.0));
    robot.state_mut().set_metric("tread_confidence", 0.9);

    robot
        .handle_message(HostMessage::ExecuteBehavior {
            behavior: "recover".into(),
        })
        .unwrap();
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "recover");

    robot
        .handle_message(HostMessage::ExecuteBehavior { behavior: "walk".into() })
        .unwrap();
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "walk");
    assert_eq!(behavior(&robot, "recover").stats().stop_calls, 1);

    // The strategy never fired, so the stopped run left it ready
    robot.state_mut().set_metric("tread_confidence", 0.1);
    robot.tick().unwrap();
    assert_eq!(robot.manager().current_behavior_name(), "recover");
    assert!(robot.manager().is_running_reactionary());
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let mut manager = BehaviorManager::new(Rc::new(ManualClock::new()));
    let mut bus = EventBus::new();
    manager.init(&walk_and_flinch(true), &mut bus).unwrap();

    assert_eq!(bus.publish(&RobotEvent::new(EventTag::CliffDetected)), 1);
    assert_eq!(manager.pump_events(), 1);
    assert_eq!(manager.current_behavior_name(), "flinch");

    manager.unsubscribe_events(&mut bus);
    assert_eq!(bus.publish(&RobotEvent::new(EventTag::RobotPickedUp)), 0);
    assert_eq!(manager.pump_events(), 0);
}
