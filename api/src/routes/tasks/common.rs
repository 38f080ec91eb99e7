use grader::TaskDescriptor;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub name: String,
    pub order: i32,
    pub instruction: String,
    pub reward: u32,
    pub time_limit: u32,
    pub filter: String,
    pub tests: Vec<String>,
}

impl From<&TaskDescriptor> for TaskResponse {
    fn from(task: &TaskDescriptor) -> Self {
        Self {
            name: task.name.clone(),
            order: task.order,
            instruction: task.instruction.clone(),
            reward: task.reward,
            time_limit: task.time_limit,
            filter: task.filter.clone(),
            tests: task.tests.clone(),
        }
    }
}
