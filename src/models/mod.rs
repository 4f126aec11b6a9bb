pub mod change_order;
pub mod openai;

pub use change_order::{
    ChangeOrderInput, EquipmentItem, GeneralRequirementItem, LaborItem, MaterialItem,
    SubcontractorItem, ValidationError,
};
