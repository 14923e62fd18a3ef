//! Company (economic actor) components and the role classification the
//! primary coloring pass runs for company-occupied buildings.

use bevy::prelude::*;

use crate::economy::ResourceKind;

/// Marker for every company entity.
#[derive(Component, Debug, Default)]
pub struct Company;

/// Company that sells its output directly to customers.
#[derive(Component, Debug, Default)]
pub struct ServiceAvailable;

/// Company that turns inputs into an output resource.
#[derive(Component, Debug, Default)]
pub struct ProcessingCompany;

/// Processing company that extracts its raw inputs on site. Every extractor
/// is also a [`ProcessingCompany`]; the reverse does not hold.
#[derive(Component, Debug, Default)]
pub struct ExtractorCompany;

/// Company that operates a warehouse.
#[derive(Component, Debug, Default)]
pub struct StorageCompany;

/// Declared stored-resource type of a storage company.
#[derive(Component, Debug, Clone, Copy)]
pub struct StoredResource(pub ResourceKind);

/// Declared industrial process: up to two inputs, one output.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct IndustrialProcess {
    pub input1: Option<ResourceKind>,
    pub input2: Option<ResourceKind>,
    pub output: Option<ResourceKind>,
}

/// Behavior tags resolved for a company entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct BehaviorTags {
    pub service: bool,
    pub processing: bool,
    pub extractor: bool,
    pub storage: bool,
}

/// Resources a company requires, produces, sells, or stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanyRoles {
    pub requires1: Option<ResourceKind>,
    pub requires2: Option<ResourceKind>,
    pub produces: Option<ResourceKind>,
    pub sells: Option<ResourceKind>,
    pub stores: Option<ResourceKind>,
}

/// Resolve the economic roles of a company from its behavior tags and
/// declared process.
///
/// The branches are evaluated in fixed priority order and the first match
/// wins. The tags are mutually exclusive in practice, but the order matters
/// if that ever stops holding:
///
/// 1. Service company: sells the output; requires the inputs that differ
///    from the output, deduplicated against each other.
/// 2. Processing company: produces the output; unless it is also an
///    extractor, requires both inputs verbatim (no dedup, empty slots
///    included as declared).
/// 3. Storage company: stores the declared stored-resource type.
pub fn classify_roles(
    process: &IndustrialProcess,
    tags: BehaviorTags,
    stored: Option<ResourceKind>,
) -> CompanyRoles {
    let mut roles = CompanyRoles::default();
    let input1 = process.input1;
    let input2 = process.input2;
    let output = process.output;

    if tags.service {
        if input1.is_some() && input1 != output {
            roles.requires1 = input1;
        }
        if input2.is_some() && input2 != output && input2 != input1 {
            roles.requires2 = input2;
        }
        roles.sells = output;
    } else if tags.processing {
        // Only a non-extractor sources its inputs from the tracked economy.
        if !tags.extractor {
            roles.requires1 = input1;
            roles.requires2 = input2;
        }
        roles.produces = output;
    } else if tags.storage {
        roles.stores = stored;
    }

    roles
}
