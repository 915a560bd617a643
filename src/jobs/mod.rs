pub mod alerts_check;
