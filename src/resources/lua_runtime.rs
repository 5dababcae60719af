//! Lua scripting runtime resource.
//!
//! The runtime exposes an `engine` table with logging functions and lets the
//! host hand [`Sprite`]s to scripts as userdata. Scripts read and write the
//! sprite through snake_case methods; positions and colors come back as
//! tables.
//!
//! # Example
//!
//! ```lua
//! -- From a Lua script, with `hero` pushed by the host
//! engine.log("Hello from Lua!")
//! hero:set_pos(120, 80)
//! hero:set_origin_to_center()
//! hero:set_color(255, 128, 0)
//! local pos = hero:get_pos()      -- { x = 120, y = 80 }
//! local color = hero:get_color()  -- { r = 255, g = 128, b = 0 }
//! ```

use log::{error, info, warn};
use mlua::prelude::*;

use crate::components::sprite::Sprite;

impl LuaUserData for Sprite {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("get_x", |_, this, ()| Ok(this.x()));
        methods.add_method("get_y", |_, this, ()| Ok(this.y()));
        methods.add_method_mut("set_x", |_, this, x: f32| {
            this.set_x(x);
            Ok(())
        });
        methods.add_method_mut("set_y", |_, this, y: f32| {
            this.set_y(y);
            Ok(())
        });
        methods.add_method("get_pos", |lua, this, ()| {
            let pos = lua.create_table()?;
            pos.set("x", this.x())?;
            pos.set("y", this.y())?;
            Ok(pos)
        });
        methods.add_method_mut("set_pos", |_, this, (x, y): (f32, f32)| {
            this.set_pos(x, y);
            Ok(())
        });

        methods.add_method("get_width", |_, this, ()| Ok(this.width()));
        methods.add_method("get_height", |_, this, ()| Ok(this.height()));
        methods.add_method_mut("set_width", |_, this, width: f32| {
            this.set_width(width);
            Ok(())
        });
        methods.add_method_mut("set_height", |_, this, height: f32| {
            this.set_height(height);
            Ok(())
        });
        methods.add_method_mut("set_size", |_, this, (width, height): (f32, f32)| {
            this.set_size(width, height);
            Ok(())
        });

        methods.add_method("get_origin_x", |_, this, ()| Ok(this.origin_x()));
        methods.add_method("get_origin_y", |_, this, ()| Ok(this.origin_y()));
        methods.add_method_mut("set_origin_x", |_, this, origin_x: f32| {
            this.set_origin_x(origin_x);
            Ok(())
        });
        methods.add_method_mut("set_origin_y", |_, this, origin_y: f32| {
            this.set_origin_y(origin_y);
            Ok(())
        });
        methods.add_method_mut("set_origin", |_, this, (x, y): (f32, f32)| {
            this.set_origin(x, y);
            Ok(())
        });
        methods.add_method_mut("set_origin_to_center", |_, this, ()| {
            this.set_origin_to_center();
            Ok(())
        });

        methods.add_method("get_scale_x", |_, this, ()| Ok(this.scale_x()));
        methods.add_method("get_scale_y", |_, this, ()| Ok(this.scale_y()));
        methods.add_method_mut("set_scale_x", |_, this, scale_x: f32| {
            this.set_scale_x(scale_x);
            Ok(())
        });
        methods.add_method_mut("set_scale_y", |_, this, scale_y: f32| {
            this.set_scale_y(scale_y);
            Ok(())
        });
        methods.add_method_mut("set_scale", |_, this, scale: f32| {
            this.set_scale(scale);
            Ok(())
        });

        methods.add_method("get_angle", |_, this, ()| Ok(this.angle()));
        methods.add_method_mut("set_angle", |_, this, angle: f32| {
            this.set_angle(angle);
            Ok(())
        });

        methods.add_method_mut("set_color", |_, this, (r, g, b): (f32, f32, f32)| {
            this.set_color(r, g, b);
            Ok(())
        });
        methods.add_method("get_color", |lua, this, ()| {
            let (r, g, b) = this.color();
            let color = lua.create_table()?;
            color.set("r", r)?;
            color.set("g", g)?;
            color.set("b", b)?;
            Ok(color)
        });
        methods.add_method("get_alpha", |_, this, ()| Ok(this.alpha()));
        methods.add_method_mut("set_alpha", |_, this, alpha: f32| {
            this.set_alpha(alpha);
            Ok(())
        });

        methods.add_method("is_valid", |_, this, ()| Ok(this.is_valid()));
    }
}

/// Lua interpreter state.
///
/// Not thread-safe: insert with `insert_non_send_resource` and access through
/// `NonSend<LuaRuntime>`.
pub struct LuaRuntime {
    lua: Lua,
}

impl LuaRuntime {
    /// Creates a new Lua runtime and registers the base engine API.
    ///
    /// # Errors
    ///
    /// Returns an error if Lua initialization or API registration fails.
    pub fn new() -> LuaResult<Self> {
        let lua = Lua::new();

        let runtime = Self { lua };
        runtime.register_base_api()?;

        Ok(runtime)
    }

    /// Registers the base `engine` table with logging functions.
    fn register_base_api(&self) -> LuaResult<()> {
        let engine = self.lua.create_table()?;

        // engine.log(message) - General purpose logging
        engine.set(
            "log",
            self.lua.create_function(|_, msg: String| {
                info!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        engine.set(
            "log_info",
            self.lua.create_function(|_, msg: String| {
                info!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        engine.set(
            "log_warn",
            self.lua.create_function(|_, msg: String| {
                warn!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        engine.set(
            "log_error",
            self.lua.create_function(|_, msg: String| {
                error!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        self.lua.globals().set("engine", engine)?;

        Ok(())
    }

    /// Expose `sprite` to scripts as the global `name`.
    pub fn set_sprite(&self, name: &str, sprite: Sprite) -> LuaResult<()> {
        self.lua.globals().set(name, sprite)
    }

    /// Copy the sprite stored in global `name` back out of Lua.
    pub fn get_sprite(&self, name: &str) -> LuaResult<Sprite> {
        let userdata: LuaAnyUserData = self.lua.globals().get(name)?;
        let sprite = userdata.borrow::<Sprite>()?;
        Ok(sprite.clone())
    }

    /// Executes a chunk of Lua source.
    pub fn exec(&self, chunk: &str) -> LuaResult<()> {
        self.lua.load(chunk).exec()
    }

    /// Loads and executes a Lua script from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the script has syntax/runtime errors.
    pub fn run_script(&self, path: &str) -> LuaResult<()> {
        let script = std::fs::read_to_string(path)
            .map_err(|e| LuaError::ExternalError(std::sync::Arc::new(e)))?;
        self.lua.load(&script).set_name(path).exec()
    }

    /// Calls a global Lua function by name with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the function doesn't exist or execution fails.
    pub fn call_function<A, R>(&self, name: &str, args: A) -> LuaResult<R>
    where
        A: IntoLuaMulti,
        R: FromLuaMulti,
    {
        let func: LuaFunction = self.lua.globals().get(name)?;
        func.call(args)
    }

    /// Checks if a global function exists.
    pub fn has_function(&self, name: &str) -> bool {
        self.lua.globals().get::<LuaFunction>(name).is_ok()
    }
}
