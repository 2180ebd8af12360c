pub mod assignments;
pub mod badges;
pub mod courses;
pub mod forums;
pub mod materials;
pub mod missions;
pub mod progress;
pub mod quizzes;
pub mod users;

#[cfg(test)]
pub(crate) mod testutil;
