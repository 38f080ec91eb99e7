//! Task catalog: the ordered snapshot of gradable units.
//!
//! The source of truth is a declarative registration table ([`REGISTRY`]):
//! one row per underlying suite test, carrying grouping, ordering, reward and
//! time-limit metadata. [`Catalog::builtin`] derives the flat descriptor list
//! from it at call time, so the catalog is always a fresh read-only snapshot
//! and never the persisted copy.
//!
//! Deployments may override the builtin table with a generated JSON manifest
//! (`TASK_MANIFEST`), an ordered array of [`TaskDescriptor`] records.

use crate::error::GraderError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use util::config;

/// One row in the declarative registration table.
///
/// `test` is the fully-qualified test id exactly as the suite reports it.
/// Rows sharing a `group` key collapse into a single grouped descriptor.
#[derive(Debug, Clone, Copy)]
pub struct TaskReg {
    pub test: &'static str,
    pub group: Option<&'static str>,
    pub order: i32,
    pub reward: u32,
    pub time_limit: u32,
    pub instruction: &'static str,
}

/// Builtin registration table for the provisioning quest suite.
pub const REGISTRY: &[TaskReg] = &[
    TaskReg {
        test: "ProvQuest.Tests.ResourceGroupExists",
        group: None,
        order: 1,
        reward: 10,
        time_limit: 15,
        instruction: "Create a resource group named rg-quest in the westeurope region.",
    },
    TaskReg {
        test: "ProvQuest.Tests.StorageAccountCreated",
        group: None,
        order: 2,
        reward: 15,
        time_limit: 20,
        instruction: "Provision a general-purpose v2 storage account inside rg-quest.",
    },
    TaskReg {
        test: "ProvQuest.Tests.BlobContainerPrivate",
        group: Some("storage-hardening"),
        order: 3,
        reward: 10,
        time_limit: 10,
        instruction:
            "Add a blob container named artifacts and make sure public access is disabled.",
    },
    TaskReg {
        test: "ProvQuest.Tests.BlobVersioningEnabled",
        group: Some("storage-hardening"),
        order: 4,
        reward: 10,
        time_limit: 10,
        instruction: "Enable blob versioning on the storage account.",
    },
    TaskReg {
        test: "ProvQuest.Tests.VirtualNetworkCreated",
        group: Some("network"),
        order: 5,
        reward: 20,
        time_limit: 25,
        instruction: "Create a virtual network vnet-quest with address space 10.10.0.0/16.",
    },
    TaskReg {
        test: "ProvQuest.Tests.SubnetRangeValid",
        group: Some("network"),
        order: 6,
        reward: 10,
        time_limit: 10,
        instruction: "Carve a subnet snet-app of 10.10.1.0/24 out of vnet-quest.",
    },
    TaskReg {
        test: "ProvQuest.Tests.VmDeallocated",
        group: None,
        order: 7,
        reward: 25,
        time_limit: 30,
        instruction:
            "Deploy the smallest B-series VM into snet-app, then stop-deallocate it to save credits.",
    },
    TaskReg {
        test: "ProvQuest.Tests.TagPolicyApplied",
        group: None,
        order: 8,
        reward: 15,
        time_limit: 15,
        instruction: "Tag every resource in rg-quest with owner=<your student number>.",
    },
];

/// One gradable unit of work, as handed to the resolver, the reconciler and
/// the task-dispensing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Unique name within a catalog snapshot; short test id, `+`-joined when grouped.
    pub name: String,
    /// Fully-qualified ids of the member tests (never empty).
    pub tests: Vec<String>,
    /// Test-selection expression handed to the suite.
    pub filter: String,
    /// Display/catalog precedence, ascending.
    pub order: i32,
    /// Human-readable task text (possibly rephrased upstream).
    pub instruction: String,
    /// Marks earned when the task passes; sum of members for groups.
    pub reward: u32,
    /// Time budget in minutes; sum of members for groups.
    pub time_limit: u32,
}

/// A read-only, ordered snapshot of the task catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    tasks: Vec<TaskDescriptor>,
}

impl Catalog {
    /// Derive the catalog from the builtin registration table.
    pub fn builtin() -> Self {
        Self::from_registry(REGISTRY)
    }

    /// Derive a catalog from an arbitrary registration table.
    pub fn from_registry(registry: &[TaskReg]) -> Self {
        let mut tasks: Vec<TaskDescriptor> = Vec::new();
        let mut group_index: HashMap<&str, usize> = HashMap::new();

        for reg in registry {
            match reg.group {
                Some(key) => {
                    if let Some(&idx) = group_index.get(key) {
                        let task = &mut tasks[idx];
                        task.tests.push(reg.test.to_string());
                        task.name = derive_name(&task.tests);
                        task.filter = build_filter(&task.tests);
                        task.order = task.order.min(reg.order);
                        task.reward += reg.reward;
                        task.time_limit += reg.time_limit;
                    } else {
                        group_index.insert(key, tasks.len());
                        tasks.push(descriptor_for(reg));
                    }
                }
                None => tasks.push(descriptor_for(reg)),
            }
        }

        tasks.sort_by_key(|t| t.order);
        Self { tasks }
    }

    /// Load an externally generated manifest: a JSON array of descriptors.
    pub fn from_manifest(path: &Path) -> Result<Self, GraderError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| GraderError::Manifest(format!("{}: {e}", path.display())))?;
        let mut tasks: Vec<TaskDescriptor> = serde_json::from_str(&raw)
            .map_err(|e| GraderError::Manifest(format!("{}: {e}", path.display())))?;
        tasks.sort_by_key(|t| t.order);
        Ok(Self { tasks })
    }

    /// Load the current catalog: the configured manifest when one is set,
    /// otherwise the builtin table. A configured-but-broken manifest is an
    /// error so that callers can apply their own degradation policy.
    pub fn load() -> Result<Self, GraderError> {
        let manifest = config::task_manifest();
        if manifest.trim().is_empty() {
            return Ok(Self::builtin());
        }
        Self::from_manifest(Path::new(&manifest))
    }

    pub fn tasks(&self) -> &[TaskDescriptor] {
        &self.tasks
    }

    /// Case-insensitive exact match on the descriptor name.
    pub fn find_by_name(&self, name: &str) -> Option<&TaskDescriptor> {
        self.tasks
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Flatten every descriptor's member tests into `test id -> reward`.
    ///
    /// The reconciler must never award a mark for a test absent from this
    /// projection, so this is the single authority on what a pass is worth.
    pub fn reward_projection(&self) -> HashMap<String, u32> {
        let mut projection = HashMap::new();
        for task in &self.tasks {
            for test in &task.tests {
                projection.insert(test.clone(), task.reward);
            }
        }
        projection
    }

    #[cfg(test)]
    pub(crate) fn from_tasks(tasks: Vec<TaskDescriptor>) -> Self {
        Self { tasks }
    }
}

fn descriptor_for(reg: &TaskReg) -> TaskDescriptor {
    let tests = vec![reg.test.to_string()];
    TaskDescriptor {
        name: derive_name(&tests),
        filter: build_filter(&tests),
        tests,
        order: reg.order,
        instruction: reg.instruction.to_string(),
        reward: reg.reward,
        time_limit: reg.time_limit,
    }
}

/// Human task name: the short (last dot segment) test id, `+`-joined for groups.
fn derive_name(tests: &[String]) -> String {
    tests
        .iter()
        .map(|t| short_id(t))
        .collect::<Vec<_>>()
        .join("+")
}

fn short_id(test: &str) -> &str {
    test.rsplit('.').next().unwrap_or(test)
}

/// Selection expression: equality on the full test id, OR-joined for groups.
fn build_filter(tests: &[String]) -> String {
    tests
        .iter()
        .map(|t| format!("test=={t}"))
        .collect::<Vec<_>>()
        .join(" || ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin()
    }

    #[test]
    fn independent_task_derives_short_name_and_equality_filter() {
        let c = catalog();
        let rg = c.find_by_name("ResourceGroupExists").expect("in catalog");
        assert_eq!(rg.tests, vec!["ProvQuest.Tests.ResourceGroupExists"]);
        assert_eq!(rg.filter, "test==ProvQuest.Tests.ResourceGroupExists");
        assert_eq!(rg.reward, 10);
    }

    #[test]
    fn grouped_tasks_collapse_with_summed_metadata() {
        let c = catalog();
        let net = c
            .find_by_name("VirtualNetworkCreated+SubnetRangeValid")
            .expect("grouped descriptor");
        assert_eq!(net.tests.len(), 2);
        assert_eq!(
            net.filter,
            "test==ProvQuest.Tests.VirtualNetworkCreated || test==ProvQuest.Tests.SubnetRangeValid"
        );
        assert_eq!(net.reward, 30);
        assert_eq!(net.time_limit, 35);
        // Group takes the smallest member order and the first member's text.
        assert_eq!(net.order, 5);
        assert!(net.instruction.contains("vnet-quest"));
    }

    #[test]
    fn catalog_is_ordered_ascending() {
        let c = catalog();
        let orders: Vec<i32> = c.tasks().iter().map(|t| t.order).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let c = catalog();
        assert!(c.find_by_name("resourcegroupexists").is_some());
        assert!(c.find_by_name("RESOURCEGROUPEXISTS").is_some());
        assert!(c.find_by_name("NoSuchTask").is_none());
    }

    #[test]
    fn reward_projection_flattens_group_members() {
        let c = catalog();
        let projection = c.reward_projection();
        // Both members of the grouped descriptor map to the summed group reward.
        assert_eq!(
            projection.get("ProvQuest.Tests.VirtualNetworkCreated"),
            Some(&30)
        );
        assert_eq!(projection.get("ProvQuest.Tests.SubnetRangeValid"), Some(&30));
        assert_eq!(
            projection.get("ProvQuest.Tests.ResourceGroupExists"),
            Some(&10)
        );
        assert!(!projection.contains_key("ProvQuest.Tests.Unknown"));
    }

    #[test]
    fn manifest_round_trips_and_sorts_by_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tasks.json");
        let manifest = serde_json::json!([
            {
                "name": "Task2",
                "tests": ["Suite.B"],
                "filter": "test==Suite.B",
                "order": 2,
                "instruction": "do B",
                "reward": 5,
                "time_limit": 5
            },
            {
                "name": "Task1",
                "tests": ["Suite.A"],
                "filter": "test==Suite.A",
                "order": 1,
                "instruction": "do A",
                "reward": 10,
                "time_limit": 5
            }
        ]);
        std::fs::write(&path, manifest.to_string()).unwrap();

        let c = Catalog::from_manifest(&path).unwrap();
        assert_eq!(c.tasks()[0].name, "Task1");
        assert_eq!(c.tasks()[1].name, "Task2");
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let err = Catalog::from_manifest(Path::new("/definitely/not/here.json"));
        assert!(matches!(err, Err(GraderError::Manifest(_))));
    }
}
