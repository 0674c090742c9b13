//! One module per constraint kind.

pub(crate) mod bounds;
pub(crate) mod identity;
pub(crate) mod instance_id;
pub(crate) mod leafref;
pub(crate) mod mandatory;
pub(crate) mod must;
pub(crate) mod unique;
pub(crate) mod when;
