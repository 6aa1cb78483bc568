//! Failure injection for the [`MockServer`](crate::mock::MockServer), so that tests can see how the app copes with
//! an unreachable server
#![cfg(feature = "mock_server")]

use std::collections::HashMap;

use crate::error::ApiError;

/// The calls of a [`TaskSource`](crate::traits::TaskSource) that can be made to fail
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Register,
    Logout,
    ListTasks,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Login,
        Operation::Register,
        Operation::Logout,
        Operation::ListTasks,
        Operation::CreateTask,
        Operation::UpdateTask,
        Operation::DeleteTask,
    ];
}

/// `successes` calls go through, then the next `failures` calls fail. Every call after that goes through
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FailurePlan {
    pub successes: u32,
    pub failures: u32,
}

impl FailurePlan {
    /// Use up one call of this plan, and tell whether that call fails
    fn next_call_fails(&mut self) -> bool {
        if self.successes > 0 {
            self.successes -= 1;
            false
        } else if self.failures > 0 {
            self.failures -= 1;
            true
        } else {
            false
        }
    }
}


/// How a mocked server misbehaves during a test.
///
/// Mocked failures are connectivity errors, as if the server could not be reached.
/// Operations without a plan always succeed.
#[derive(Clone, Debug, Default)]
pub struct MockBehaviour {
    /// While suspended, every call goes through and no plan is used up
    pub is_suspended: bool,
    plans: HashMap<Operation, FailurePlan>,
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails right away, `n_fails` times each
    pub fn fail_now(n_fails: u32) -> Self {
        Operation::ALL.iter()
            .fold(Self::new(), |behaviour, op| behaviour.failing(*op, 0, n_fails))
    }

    /// Let `op` succeed `after` times, then fail `times` times
    pub fn failing(mut self, op: Operation, after: u32, times: u32) -> Self {
        self.plans.insert(op, FailurePlan { successes: after, failures: times });
        self
    }

    pub fn plan(&self, op: Operation) -> FailurePlan {
        self.plans.get(&op).copied().unwrap_or_default()
    }

    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }

    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    /// Called by the mock before serving `op`
    pub fn check(&mut self, op: Operation) -> Result<(), ApiError> {
        if self.is_suspended {
            return Ok(());
        }
        let plan = match self.plans.get_mut(&op) {
            None => return Ok(()),
            Some(plan) => plan,
        };

        if plan.next_call_fails() {
            log::debug!("Mock behaviour: failing a {:?} call ({:?} left)", op, plan);
            Err(ApiError::Connectivity(format!("mocked failure of {:?}", op)))
        } else {
            log::debug!("Mock behaviour: allowing a {:?} call", op);
            Ok(())
        }
    }
}
