//! Player collection owned by the embedding page

use vsl_core::Registry;
use wasm_bindgen::prelude::*;

use crate::player::VslPlayer;

/// Mounted players, keyed by their `id`.
///
/// ```javascript
/// const players = new VslPlayerRegistry();
/// const player = players.mount('#vsl', { videoSrc: '/offer/master.m3u8' });
/// players.destroy(player.id);
/// ```
#[wasm_bindgen]
#[derive(Default)]
pub struct VslPlayerRegistry {
    players: Registry<VslPlayer>,
}

#[wasm_bindgen]
impl VslPlayerRegistry {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a player and keep it. Returns `undefined` if mounting failed.
    pub fn mount(&mut self, selector: &str, options: JsValue) -> Option<VslPlayer> {
        // Players destroyed through their own handle leave the registry here
        self.players.prune(|player| !player.is_destroyed());

        match VslPlayer::mount(selector, &options) {
            Ok(player) => {
                self.players.insert(player.instance_id(), player.clone());
                Some(player)
            }
            Err(e) => {
                crate::report_mount_error(&e);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<VslPlayer> {
        let id = id.parse().ok()?;
        self.players.get(id).cloned()
    }

    /// Destroy and forget one player. Returns whether it was registered.
    pub fn destroy(&mut self, id: &str) -> bool {
        let Ok(id) = id.parse() else {
            return false;
        };
        match self.players.remove(id) {
            Some(player) => {
                player.destroy();
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = destroyAll)]
    pub fn destroy_all(&mut self) {
        for player in self.players.drain() {
            player.destroy();
        }
    }

    #[wasm_bindgen(getter)]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
