//! Device-control skills: context, OS actions, cross-device, prediction, mood.

pub mod cross_device;
pub mod emotion;
pub mod hyper_context;
pub mod launcher;
pub mod pc_control;
pub mod predictor;
