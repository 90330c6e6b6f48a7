//! Then steps for task assignment BDD scenarios.

use super::world::{AssignmentWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::then;
use taskroster::error::{ClassifyError, ErrorClass};
use taskroster::query::{ListOutcome, ListParams};
use taskroster::task::domain::Assignment;

#[then(r#"the task is assigned to "{user_name}""#)]
fn task_assigned_to(world: &AssignmentWorld, user_name: String) -> Result<(), eyre::Report> {
    let expected = world.user(&user_name)?;
    let stored = run_async(world.tasks.get(world.task()?.id())).wrap_err("reload task")?;

    if stored.assignment() != &Assignment::to_user(expected) {
        return Err(eyre::eyre!(
            "expected task assigned to {user_name}, found {:?}",
            stored.assignment()
        ));
    }
    Ok(())
}

#[then("the task is unassigned")]
fn task_unassigned(world: &AssignmentWorld) -> Result<(), eyre::Report> {
    let stored = run_async(world.tasks.get(world.task()?.id())).wrap_err("reload task")?;

    if stored.assignment() != &Assignment::Unassigned {
        return Err(eyre::eyre!(
            "expected an unassigned task, found {:?}",
            stored.assignment()
        ));
    }
    Ok(())
}

#[then(r#"the user "{user_name}" has {count:usize} pending tasks"#)]
fn user_has_pending_tasks(
    world: &AssignmentWorld,
    user_name: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let user_id = world.user(&user_name)?.id();
    let stored = run_async(world.users.get(user_id)).wrap_err("reload user")?;

    if stored.pending_tasks().len() != count {
        return Err(eyre::eyre!(
            "expected {count} pending tasks for {user_name}, found {:?}",
            stored.pending_tasks()
        ));
    }
    Ok(())
}

#[then("the task request is rejected as a bad request")]
fn task_request_rejected(world: &AssignmentWorld) -> Result<(), eyre::Report> {
    let err = world
        .last_task_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the task request to fail"))?;

    if err.class() != ErrorClass::BadRequest {
        return Err(eyre::eyre!("expected a bad request, got {err:?}"));
    }
    Ok(())
}

#[then("no tasks are stored")]
fn no_tasks_stored(world: &AssignmentWorld) -> Result<(), eyre::Report> {
    let outcome = run_async(world.tasks.list(&ListParams::default().with_count("true")))
        .wrap_err("count tasks")?;

    if outcome != ListOutcome::Count(0) {
        return Err(eyre::eyre!("expected no stored tasks, found {outcome:?}"));
    }
    Ok(())
}
