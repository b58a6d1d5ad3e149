use crate::model::{Blueprint, ROOT_SENTINEL, Task, TaskArgs, TaskId};

pub struct BlueprintBuilder {
    description: String,
    pub tasks: Vec<Task>, // public so tests can corrupt a built graph by hand
}

impl BlueprintBuilder {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            tasks: Vec::new(),
        }
    }

    pub fn task(self, id: TaskId, name: &str, service_name: &str) -> TaskBuilder {
        TaskBuilder {
            blueprint_builder: self,
            id,
            name: name.to_string(),
            service_name: service_name.to_string(),
            dependencies: Vec::new(),
            arguments: TaskArgs::default(),
        }
    }

    /// Shorthand for a task with no arguments.
    pub fn simple(self, id: TaskId, dependencies: &[TaskId]) -> Self {
        let name = format!("task-{}", id);
        let service = format!("service-{}", id);
        let mut task = self.task(id, &name, &service);
        if dependencies.is_empty() {
            task = task.root();
        } else {
            task = task.depends_on(dependencies);
        }
        task.build()
    }

    pub fn build(self) -> Blueprint {
        Blueprint {
            description: self.description,
            tasks: self.tasks,
        }
    }
}

pub struct TaskBuilder {
    blueprint_builder: BlueprintBuilder,
    id: TaskId,
    name: String,
    service_name: String,
    dependencies: Vec<TaskId>,
    arguments: TaskArgs,
}

impl TaskBuilder {
    pub fn root(mut self) -> Self {
        self.dependencies = vec![ROOT_SENTINEL];
        self
    }

    pub fn depends_on(mut self, ids: &[TaskId]) -> Self {
        self.dependencies.extend_from_slice(ids);
        self
    }

    pub fn image(mut self, token: &str) -> Self {
        self.arguments.image = Some(token.to_string());
        self
    }

    pub fn text(mut self, token: &str) -> Self {
        self.arguments.text = Some(token.to_string());
        self
    }

    pub fn document(mut self, token: &str) -> Self {
        self.arguments.document = Some(token.to_string());
        self
    }

    pub fn build(mut self) -> BlueprintBuilder {
        self.blueprint_builder.tasks.push(Task {
            id: self.id,
            name: self.name,
            service_name: self.service_name,
            dependencies: self.dependencies,
            arguments: self.arguments,
        });
        self.blueprint_builder
    }
}
