pub mod campaigns;
pub mod cart;
pub mod checkout;
pub mod dashboard;
pub mod impact;
pub mod leaderboard;
pub mod requests;
