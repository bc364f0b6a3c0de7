//! Read-only views of the financial entities the rules evaluate.
//!
//! These rows are owned by the accounts/credit-card CRUD layer; PayWatch
//! only reads them.

pub mod credit_card;
pub mod fixed_payment;
pub mod installment;
pub mod spending;

pub use credit_card::CreditCard;
pub use fixed_payment::FixedPayment;
pub use installment::InstallmentPlan;
pub use spending::CategorySpending;
