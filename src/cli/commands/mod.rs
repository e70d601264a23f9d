pub mod inspect;
pub mod rollout;
pub mod train;
