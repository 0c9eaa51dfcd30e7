use wasm_bindgen::prelude::*;
use chase_engine::*;

pub mod config;
pub mod game;
pub mod layers;
pub mod pursuer;
pub mod steering;
pub mod terrain;
pub mod vehicle;
pub mod wheel;

#[cfg(test)]
mod testing;

use game::ForestChase;

chase_web::export_game!(ForestChase, "forest-chase");
