//! Given steps for task assignment BDD scenarios.

use super::world::{AssignmentWorld, DEADLINE_MILLIS, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskroster::task::services::TaskWriteRequest;
use taskroster::user::services::UserWriteRequest;

#[given(r#"a user "{name}" with email "{email}""#)]
fn a_user(world: &mut AssignmentWorld, name: String, email: String) -> Result<(), eyre::Report> {
    let user = run_async(
        world
            .users
            .create(UserWriteRequest::new(name.clone(), email)),
    )
    .wrap_err("create user for assignment scenario")?;
    world.known_users.insert(name, user);
    Ok(())
}

#[given(r#"a task "{task_name}" assigned to "{user_name}""#)]
fn a_task_assigned_to(
    world: &mut AssignmentWorld,
    task_name: String,
    user_name: String,
) -> Result<(), eyre::Report> {
    let owner = world.user(&user_name)?.id();
    let task = run_async(world.tasks.create(
        TaskWriteRequest::new(task_name, DEADLINE_MILLIS).with_assigned_user(owner.to_string()),
    ))
    .wrap_err("create assigned task in scenario setup")?;
    world.current_task = Some(task);
    Ok(())
}
