// src/lib.rs

// --- Declaração dos Módulos ---
// Expostos como biblioteca para o binário e para os testes de integração.
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod templates;
pub mod web;
