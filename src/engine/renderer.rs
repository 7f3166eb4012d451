use wasm_bindgen::prelude::*;
use web_sys::{WebGlBuffer, WebGlProgram, WebGlRenderingContext, WebGlUniformLocation};
use nalgebra::{Matrix4, Point3};
use crate::engine::mesh::{Mesh, VERTEX_STRIDE};

// Everything is in view space: model-view matrices are composed on the CPU
// relative to the eye.
const VERTEX_SHADER: &str = r#"
    attribute vec3 aPosition;
    attribute vec3 aNormal;
    uniform mat4 uModelView;
    uniform mat4 uProjection;
    varying vec3 vNormal;
    varying vec3 vView;
    void main() {
        vec4 view = uModelView * vec4(aPosition, 1.0);
        gl_Position = uProjection * view;
        vView = view.xyz;
        vNormal = (uModelView * vec4(aNormal, 0.0)).xyz;
    }
"#;

const FRAGMENT_SHADER: &str = r#"
    #ifdef GL_FRAGMENT_PRECISION_HIGH
    precision highp float;
    #else
    precision mediump float;
    #endif
    varying vec3 vNormal;
    varying vec3 vView;
    uniform vec3 uColor;
    uniform vec3 uSunView;
    uniform bool uLit;
    uniform float uOpacity;

    void main() {
        vec3 color = uColor;
        if (uLit) {
            vec3 toSun = normalize(uSunView - vView);
            float diffuse = max(dot(normalize(vNormal), toSun), 0.0);
            color *= 0.5 + 0.5 * diffuse;
        }
        gl_FragColor = vec4(color, uOpacity);
    }
"#;

/// GPU buffers of a mesh, uploaded once and drawn every frame.
pub struct MeshHandle {
    vertex_buffer: WebGlBuffer,
    index_buffer: WebGlBuffer,
    index_count: i32,
}

/// GPU buffer of a line strip.
pub struct LineHandle {
    buffer: WebGlBuffer,
    vertex_count: i32,
}

pub struct Renderer {
    pub gl: WebGlRenderingContext,
    model_view_location: WebGlUniformLocation,
    projection_location: WebGlUniformLocation,
    color_location: WebGlUniformLocation,
    sun_location: WebGlUniformLocation,
    lit_location: WebGlUniformLocation,
    opacity_location: WebGlUniformLocation,
    position_attrib: u32,
    normal_attrib: u32,
}

impl Renderer {
    pub fn new(gl: WebGlRenderingContext) -> Result<Self, JsValue> {
        let program = create_program(&gl)?;
        gl.use_program(Some(&program));

        let model_view_location = gl.get_uniform_location(&program, "uModelView")
            .ok_or("Failed to get uModelView location")?;
        let projection_location = gl.get_uniform_location(&program, "uProjection")
            .ok_or("Failed to get uProjection location")?;
        let color_location = gl.get_uniform_location(&program, "uColor")
            .ok_or("Failed to get uColor location")?;
        let sun_location = gl.get_uniform_location(&program, "uSunView")
            .ok_or("Failed to get uSunView location")?;
        let lit_location = gl.get_uniform_location(&program, "uLit")
            .ok_or("Failed to get uLit location")?;
        let opacity_location = gl.get_uniform_location(&program, "uOpacity")
            .ok_or("Failed to get uOpacity location")?;

        let position_attrib = gl.get_attrib_location(&program, "aPosition");
        let normal_attrib = gl.get_attrib_location(&program, "aNormal");
        if position_attrib < 0 || normal_attrib < 0 {
            return Err(JsValue::from_str("Failed to get attribute locations"));
        }

        Ok(Renderer {
            gl,
            model_view_location,
            projection_location,
            color_location,
            sun_location,
            lit_location,
            opacity_location,
            position_attrib: position_attrib as u32,
            normal_attrib: normal_attrib as u32,
        })
    }

    pub fn clear(&self, r: f32, g: f32, b: f32) {
        self.gl.clear_color(r, g, b, 1.0);
        self.gl.clear(WebGlRenderingContext::COLOR_BUFFER_BIT | WebGlRenderingContext::DEPTH_BUFFER_BIT);
    }

    pub fn enable_depth_test(&self) {
        self.gl.enable(WebGlRenderingContext::DEPTH_TEST);
    }

    pub fn enable_blend(&self) {
        self.gl.enable(WebGlRenderingContext::BLEND);
        self.gl.blend_func(WebGlRenderingContext::SRC_ALPHA, WebGlRenderingContext::ONE_MINUS_SRC_ALPHA);
    }

    pub fn disable_blend(&self) {
        self.gl.disable(WebGlRenderingContext::BLEND);
    }

    pub fn resize(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }

    /// Per-frame camera state: the projection and the sun's view-space position.
    pub fn set_camera(&self, projection: &Matrix4<f32>, sun_view: &Point3<f32>) {
        self.gl.uniform_matrix4fv_with_f32_array(Some(&self.projection_location), false, projection.as_slice());
        self.gl.uniform3f(Some(&self.sun_location), sun_view.x, sun_view.y, sun_view.z);
    }

    pub fn upload_mesh(&self, mesh: &Mesh) -> Result<MeshHandle, JsValue> {
        let vertex_buffer = self.gl.create_buffer().ok_or("Failed to create vertex buffer")?;
        let index_buffer = self.gl.create_buffer().ok_or("Failed to create index buffer")?;

        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&vertex_buffer));
        unsafe {
            let vert_array = js_sys::Float32Array::view(&mesh.vertices);
            self.gl.buffer_data_with_array_buffer_view(
                WebGlRenderingContext::ARRAY_BUFFER,
                &vert_array,
                WebGlRenderingContext::STATIC_DRAW
            );
        }

        self.gl.bind_buffer(WebGlRenderingContext::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));
        unsafe {
            let idx_array = js_sys::Uint16Array::view(&mesh.indices);
            self.gl.buffer_data_with_array_buffer_view(
                WebGlRenderingContext::ELEMENT_ARRAY_BUFFER,
                &idx_array,
                WebGlRenderingContext::STATIC_DRAW
            );
        }

        Ok(MeshHandle {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as i32,
        })
    }

    /// Upload flattened xyz triples as a line strip. The vertices are
    /// rewritten in place with [`Renderer::update_line`].
    pub fn upload_line(&self, vertices: &[f32]) -> Result<LineHandle, JsValue> {
        let buffer = self.gl.create_buffer().ok_or("Failed to create line buffer")?;
        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&buffer));
        unsafe {
            let vert_array = js_sys::Float32Array::view(vertices);
            self.gl.buffer_data_with_array_buffer_view(
                WebGlRenderingContext::ARRAY_BUFFER,
                &vert_array,
                WebGlRenderingContext::DYNAMIC_DRAW
            );
        }
        Ok(LineHandle {
            buffer,
            vertex_count: (vertices.len() / 3) as i32,
        })
    }

    /// Overwrite a line's vertices. `vertices` must not be longer than the
    /// original upload.
    pub fn update_line(&self, handle: &LineHandle, vertices: &[f32]) {
        let len = vertices.len().min(handle.vertex_count as usize * 3);
        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&handle.buffer));
        unsafe {
            let vert_array = js_sys::Float32Array::view(&vertices[..len]);
            self.gl.buffer_sub_data_with_i32_and_array_buffer_view(
                WebGlRenderingContext::ARRAY_BUFFER,
                0,
                &vert_array
            );
        }
    }

    pub fn draw_mesh(
        &self,
        handle: &MeshHandle,
        model_view: &Matrix4<f32>,
        (r, g, b): (f32, f32, f32),
        lit: bool,
        opacity: f32,
    ) {
        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&handle.vertex_buffer));
        self.gl.bind_buffer(WebGlRenderingContext::ELEMENT_ARRAY_BUFFER, Some(&handle.index_buffer));

        let stride = (VERTEX_STRIDE * 4) as i32;
        self.gl.vertex_attrib_pointer_with_i32(self.position_attrib, 3, WebGlRenderingContext::FLOAT, false, stride, 0);
        self.gl.enable_vertex_attrib_array(self.position_attrib);
        self.gl.vertex_attrib_pointer_with_i32(self.normal_attrib, 3, WebGlRenderingContext::FLOAT, false, stride, 12);
        self.gl.enable_vertex_attrib_array(self.normal_attrib);

        self.gl.uniform3f(Some(&self.color_location), r, g, b);
        self.gl.uniform1i(Some(&self.lit_location), lit as i32);
        self.gl.uniform1f(Some(&self.opacity_location), opacity);
        self.gl.uniform_matrix4fv_with_f32_array(Some(&self.model_view_location), false, model_view.as_slice());

        self.gl.draw_elements_with_i32(
            WebGlRenderingContext::TRIANGLES,
            handle.index_count,
            WebGlRenderingContext::UNSIGNED_SHORT,
            0
        );
    }

    /// Draw a line strip, unlit.
    pub fn draw_line(&self, handle: &LineHandle, model_view: &Matrix4<f32>, (r, g, b): (f32, f32, f32), opacity: f32) {
        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&handle.buffer));

        self.gl.vertex_attrib_pointer_with_i32(self.position_attrib, 3, WebGlRenderingContext::FLOAT, false, 0, 0);
        self.gl.enable_vertex_attrib_array(self.position_attrib);
        self.gl.disable_vertex_attrib_array(self.normal_attrib);

        self.gl.uniform3f(Some(&self.color_location), r, g, b);
        self.gl.uniform1i(Some(&self.lit_location), 0);
        self.gl.uniform1f(Some(&self.opacity_location), opacity);
        self.gl.uniform_matrix4fv_with_f32_array(Some(&self.model_view_location), false, model_view.as_slice());

        self.gl.draw_arrays(WebGlRenderingContext::LINE_STRIP, 0, handle.vertex_count);
    }
}

fn create_program(gl: &WebGlRenderingContext) -> Result<WebGlProgram, JsValue> {
    let vert_shader = compile_shader(gl, WebGlRenderingContext::VERTEX_SHADER, VERTEX_SHADER)?;
    let frag_shader = compile_shader(gl, WebGlRenderingContext::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

    let program = gl.create_program().ok_or("Unable to create program")?;
    gl.attach_shader(&program, &vert_shader);
    gl.attach_shader(&program, &frag_shader);
    gl.link_program(&program);

    if gl.get_program_parameter(&program, WebGlRenderingContext::LINK_STATUS).as_bool().unwrap_or(false) {
        Ok(program)
    } else {
        Err(JsValue::from_str(&gl.get_program_info_log(&program).unwrap_or_default()))
    }
}

fn compile_shader(gl: &WebGlRenderingContext, shader_type: u32, source: &str) -> Result<web_sys::WebGlShader, JsValue> {
    let shader = gl.create_shader(shader_type).ok_or("Unable to create shader")?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl.get_shader_parameter(&shader, WebGlRenderingContext::COMPILE_STATUS).as_bool().unwrap_or(false) {
        Ok(shader)
    } else {
        Err(JsValue::from_str(&gl.get_shader_info_log(&shader).unwrap_or_default()))
    }
}
