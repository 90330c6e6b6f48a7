//! When steps for task assignment BDD scenarios.

use super::world::{AssignmentWorld, DEADLINE_MILLIS, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskroster::task::services::TaskWriteRequest;
use taskroster::user::{domain::UserId, services::UserWriteRequest};

#[when(r#"a task "{task_name}" is created for "{user_name}""#)]
fn task_created_for(
    world: &mut AssignmentWorld,
    task_name: String,
    user_name: String,
) -> Result<(), eyre::Report> {
    let owner = world.user(&user_name)?.id();
    let task = run_async(world.tasks.create(
        TaskWriteRequest::new(task_name, DEADLINE_MILLIS).with_assigned_user(owner.to_string()),
    ))
    .wrap_err("create task for known user")?;
    world.current_task = Some(task);
    Ok(())
}

#[when(r#"a task "{task_name}" is created for an unknown user"#)]
fn task_created_for_unknown_user(world: &mut AssignmentWorld, task_name: String) {
    let request = TaskWriteRequest::new(task_name, DEADLINE_MILLIS)
        .with_assigned_user(UserId::new().to_string());
    match run_async(world.tasks.create(request)) {
        Ok(task) => world.current_task = Some(task),
        Err(err) => world.last_task_error = Some(err),
    }
}

#[when(r#"the task is reassigned to "{user_name}""#)]
fn task_reassigned(world: &mut AssignmentWorld, user_name: String) -> Result<(), eyre::Report> {
    let new_owner = world.user(&user_name)?.id();
    let task = world.task()?;
    let request = TaskWriteRequest::new(task.name(), DEADLINE_MILLIS)
        .with_assigned_user(new_owner.to_string());
    let updated = run_async(world.tasks.replace(task.id(), request))
        .wrap_err("reassign task")?;
    world.current_task = Some(updated);
    Ok(())
}

#[when(r#"the user "{user_name}" is deleted"#)]
fn user_deleted(world: &mut AssignmentWorld, user_name: String) -> Result<(), eyre::Report> {
    let user_id = world.user(&user_name)?.id();
    run_async(world.users.delete(user_id)).wrap_err("delete user")?;
    Ok(())
}

#[when(r#"the user "{user_name}" claims the task through pending tasks"#)]
fn user_claims_task(world: &mut AssignmentWorld, user_name: String) -> Result<(), eyre::Report> {
    let claimant = world.user(&user_name)?.clone();
    let task_id = world.task()?.id();
    let request = UserWriteRequest::new(claimant.name(), claimant.email())
        .with_pending_tasks([task_id.to_string()]);
    let updated = run_async(world.users.replace(claimant.id(), request))
        .wrap_err("claim task through pendingTasks")?;
    world.known_users.insert(user_name, updated);
    Ok(())
}
