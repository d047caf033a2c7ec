// src/models/mod.rs
pub mod presenca;
pub mod turma;
pub mod user;
