//! 自主智能体核心：Planner、顺序执行循环与过程事件

pub mod events;
pub mod loop_;
pub mod plan;
pub mod planner;

pub use events::AgentEvent;
pub use loop_::{run_plan, RunOutcome};
pub use plan::{Plan, PlanResponse, Task, TaskStatus, MAX_PLAN_TASKS};
pub use planner::Planner;
