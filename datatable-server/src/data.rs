//! Dummy users and tasks

use std::collections::HashMap;

use datatable_lib::model::Row;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack", "Karen",
    "Liam", "Mia", "Noah", "Olivia",
];

const LAST_NAMES: &[&str] = &[
    "Johnson", "Brown", "White", "Davis", "Miller", "Lee", "Wilson", "Taylor", "Moore", "Clark",
    "Doe",
];

const TASK_TITLES: &[&str] = &[
    "Review pull request",
    "Write documentation",
    "Fix login bug",
    "Plan sprint",
    "Update dependencies",
    "Prepare demo",
    "Refactor billing module",
    "Answer support tickets",
];

/// The first users are fixed so searches have known answers.
const FIXED_USERS: &[(&str, &str)] = &[("Jane", "Doe"), ("John", "Smith")];

const MAX_TASKS: u64 = 5;

/// A user as listed by `/api/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub total_tasks: u64,
}

impl User {
    /// Case-insensitive substring match on name, email or username.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.name, &self.email, &self.username]
            .iter()
            .any(|value| value.to_lowercase().contains(&needle))
    }
}

impl Row for User {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "username" => Some(self.username.clone().into()),
            "email" => Some(self.email.clone().into()),
            "totalTasks" => Some(self.total_tasks.into()),
            _ => None,
        }
    }

    fn id(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

/// A user with embedded tasks, as listed by `/api/users/with-tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWithTasks {
    #[serde(flatten)]
    pub user: User,
    pub tasks: Vec<Task>,
}

impl Row for UserWithTasks {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "tasks" => serde_json::to_value(&self.tasks).ok(),
            _ => self.user.field(key),
        }
    }

    fn id(&self) -> Option<String> {
        self.user.id()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

/// The generated users and their tasks.
#[derive(Debug, Clone)]
pub struct Dataset {
    users: Vec<User>,
    tasks: HashMap<u64, Vec<Task>>,
}

impl Dataset {
    /// Generates `size` users from `seed`.
    ///
    /// User ids start at 1. The first users are Jane Doe and John Smith;
    /// every fifth user has no tasks.
    pub fn generate(size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut users = Vec::with_capacity(size);
        let mut tasks = HashMap::with_capacity(size);
        let mut next_task_id = 1;

        for index in 0..size {
            let id = index as u64 + 1;
            let (first, last) = match FIXED_USERS.get(index) {
                Some(&(first, last)) => (first, last),
                None => (
                    FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())],
                    LAST_NAMES[rng.random_range(0..LAST_NAMES.len())],
                ),
            };

            let total_tasks = if id % 5 == 0 {
                0
            } else {
                rng.random_range(1..=MAX_TASKS)
            };

            let user_tasks: Vec<Task> = (0..total_tasks)
                .map(|_| {
                    let task = Task {
                        id: next_task_id,
                        user_id: id,
                        title: TASK_TITLES[rng.random_range(0..TASK_TITLES.len())].to_string(),
                        status: TaskStatus::ALL[rng.random_range(0..TaskStatus::ALL.len())],
                        priority: TaskPriority::ALL[rng.random_range(0..TaskPriority::ALL.len())],
                    };
                    next_task_id += 1;
                    task
                })
                .collect();

            let username = format!("{}{}", first.to_lowercase(), id);
            users.push(User {
                id,
                name: format!("{} {}", first, last),
                email: format!(
                    "{}.{}{}@example.com",
                    first.to_lowercase(),
                    last.to_lowercase(),
                    id
                ),
                username,
                total_tasks,
            });
            tasks.insert(id, user_tasks);
        }

        Self { users, tasks }
    }

    /// All users in id order.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Users matching `search`. An empty term matches everyone.
    pub fn search(&self, search: &str) -> Vec<&User> {
        self.users
            .iter()
            .filter(|user| search.is_empty() || user.matches(search))
            .collect()
    }

    /// Tasks of `user_id`, if the user exists.
    pub fn tasks_for(&self, user_id: u64) -> Option<&[Task]> {
        self.tasks.get(&user_id).map(Vec::as_slice)
    }

    /// A user with its tasks embedded.
    pub fn with_tasks(&self, user: &User) -> UserWithTasks {
        UserWithTasks {
            user: user.clone(),
            tasks: self.tasks_for(user.id).map(<[Task]>::to_vec).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let a = Dataset::generate(30, 7);
        let b = Dataset::generate(30, 7);
        assert_eq!(a.users(), b.users());
        assert_eq!(a.tasks_for(3), b.tasks_for(3));
    }

    #[test]
    fn test_fixed_users_and_task_counts() {
        let dataset = Dataset::generate(30, 42);
        assert_eq!(dataset.users().len(), 30);
        assert_eq!(dataset.users()[0].name, "Jane Doe");
        assert_eq!(dataset.users()[1].name, "John Smith");

        for user in dataset.users() {
            let tasks = dataset.tasks_for(user.id).unwrap();
            assert_eq!(tasks.len() as u64, user.total_tasks);
            assert!(tasks.iter().all(|task| task.user_id == user.id));
        }
        assert_eq!(dataset.users()[4].total_tasks, 0);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let dataset = Dataset::generate(30, 42);
        let found = dataset.search("DOE");
        assert!(found.iter().any(|user| user.name == "Jane Doe"));
        assert!(found.iter().all(|user| user.matches("doe")));
        assert_eq!(dataset.search("").len(), 30);
    }

    #[test]
    fn test_task_wire_format() {
        let task = Task {
            id: 1,
            user_id: 2,
            title: "Plan sprint".into(),
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["userId"], 2);
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["priority"], "high");
    }

    #[test]
    fn test_with_tasks_flattens_user() {
        let dataset = Dataset::generate(3, 42);
        let user = &dataset.users()[0];
        let json = serde_json::to_value(dataset.with_tasks(user)).unwrap();
        assert_eq!(json["name"], "Jane Doe");
        assert_eq!(json["totalTasks"], user.total_tasks);
        assert_eq!(json["tasks"].as_array().unwrap().len() as u64, user.total_tasks);
    }
}
