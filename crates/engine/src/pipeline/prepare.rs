// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage 3: parse `config.xml`, migrate legacy `cocoon:platform` /
//! `cocoon:plugin` elements to standard `engine` / `plugin`, install the
//! job's engine and every plugin, and run the native-lib's `prepare`.

use std::collections::HashMap;

use farm_adapters::subprocess::NATIVE_TOOL_TIMEOUT;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use super::PipelineContext;
use crate::error::BuildError;
use crate::logging::run_logged;

/// One `<engine>` or migrated `<cocoon:platform>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSpec {
    pub name: String,
    /// `None` means the `spec` attribute was absent; the installer should
    /// be passed `latest` in that case rather than a literal `*`.
    pub spec: Option<String>,
}

/// One `<plugin>` or migrated `<cocoon:plugin>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSpec {
    pub name: String,
    pub spec: String,
    pub variables: HashMap<String, String>,
}

/// Migrate legacy `cocoon:platform`/`cocoon:plugin` elements to standard
/// `engine`/`plugin` elements, defaulting a missing `spec` to `*`. Returns
/// the rewritten XML alongside the engines/plugins found (post-migration),
/// so the caller never has to re-parse.
pub fn migrate_legacy_elements(
    xml: &str,
) -> Result<(String, Vec<EngineSpec>, Vec<PluginSpec>), BuildError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());

    let mut engines = Vec::new();
    let mut plugins = Vec::new();

    loop {
        match reader
            .read_event()
            .map_err(|e| BuildError::from_stage("prepare", e))?
        {
            XmlEvent::Eof => break,
            XmlEvent::Start(e) if is_legacy_plugin(&e) => {
                let (name, spec) = plugin_name_spec(&e, &reader)?;
                let mut variables = HashMap::new();
                read_plugin_children(&mut reader, &mut variables)?;
                plugins.push(PluginSpec {
                    name: name.clone(),
                    spec: spec.clone(),
                    variables: variables.clone(),
                });
                write_plugin_element(&mut writer, &name, &spec, &variables)
                    .map_err(|e| BuildError::from_stage("prepare", e))?;
            }
            XmlEvent::Empty(e) if is_legacy_plugin(&e) => {
                let (name, spec) = plugin_name_spec(&e, &reader)?;
                plugins.push(PluginSpec {
                    name: name.clone(),
                    spec: spec.clone(),
                    variables: HashMap::new(),
                });
                write_plugin_element(&mut writer, &name, &spec, &HashMap::new())
                    .map_err(|e| BuildError::from_stage("prepare", e))?;
            }
            XmlEvent::Start(e) | XmlEvent::Empty(e) if is_legacy_platform(&e) => {
                let (name, spec) = engine_name_spec(&e, &reader)?;
                engines.push(EngineSpec {
                    name: name.clone(),
                    spec: spec.clone(),
                });
                write_engine_element(&mut writer, &name, spec.as_deref())
                    .map_err(|e| BuildError::from_stage("prepare", e))?;
            }
            XmlEvent::Start(e) if local_name(&e) == "plugin" => {
                let (name, spec) = plugin_name_spec(&e, &reader)?;
                let mut variables = HashMap::new();
                read_plugin_children(&mut reader, &mut variables)?;
                plugins.push(PluginSpec {
                    name: name.clone(),
                    spec: spec.clone(),
                    variables: variables.clone(),
                });
                write_plugin_element(&mut writer, &name, &spec, &variables)
                    .map_err(|e| BuildError::from_stage("prepare", e))?;
            }
            XmlEvent::Empty(e) if local_name(&e) == "plugin" => {
                let (name, spec) = plugin_name_spec(&e, &reader)?;
                plugins.push(PluginSpec {
                    name: name.clone(),
                    spec: spec.clone(),
                    variables: HashMap::new(),
                });
                writer
                    .write_event(XmlEvent::Empty(e.into_owned()))
                    .map_err(|e| BuildError::from_stage("prepare", e))?;
            }
            XmlEvent::Start(e) | XmlEvent::Empty(e) if local_name(&e) == "engine" => {
                let (name, spec) = engine_name_spec(&e, &reader)?;
                engines.push(EngineSpec {
                    name,
                    spec: spec.clone(),
                });
                writer
                    .write_event(XmlEvent::Empty(e.into_owned()))
                    .map_err(|e| BuildError::from_stage("prepare", e))?;
            }
            other => {
                writer
                    .write_event(other)
                    .map_err(|e| BuildError::from_stage("prepare", e))?;
            }
        }
    }

    let rewritten = String::from_utf8(writer.into_inner())
        .map_err(|e| BuildError::from_stage("prepare", e))?;
    Ok((rewritten, engines, plugins))
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn is_legacy_platform(e: &BytesStart<'_>) -> bool {
    e.name().as_ref() == b"cocoon:platform"
}

fn is_legacy_plugin(e: &BytesStart<'_>) -> bool {
    e.name().as_ref() == b"cocoon:plugin"
}

fn attr_value(e: &BytesStart<'_>, reader: &Reader<&[u8]>, key: &[u8]) -> Result<Option<String>, BuildError> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            let v = attr
                .decode_and_unescape_value(reader.decoder())
                .map_err(|e| BuildError::from_stage("prepare", e))?;
            return Ok(Some(v.into_owned()));
        }
    }
    Ok(None)
}

fn engine_name_spec(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
) -> Result<(String, Option<String>), BuildError> {
    let name = attr_value(e, reader, b"name")?
        .ok_or_else(|| BuildError::uniform("engine/cocoon:platform element missing 'name'"))?;
    let spec = attr_value(e, reader, b"spec")?
        .or(attr_value(e, reader, b"version")?)
        .filter(|s| s != "*");
    Ok((name, spec))
}

fn plugin_name_spec(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
) -> Result<(String, String), BuildError> {
    let name = attr_value(e, reader, b"name")?
        .ok_or_else(|| BuildError::uniform("plugin/cocoon:plugin element missing 'name'"))?;
    let spec = attr_value(e, reader, b"spec")?
        .or(attr_value(e, reader, b"version")?)
        .unwrap_or_else(|| "*".to_string());
    Ok((name, spec))
}

/// Consume child `<param>` elements of a `cocoon:plugin`/`plugin` start
/// tag up to its matching end tag, collecting them as variables.
fn read_plugin_children(
    reader: &mut Reader<&[u8]>,
    variables: &mut HashMap<String, String>,
) -> Result<(), BuildError> {
    loop {
        match reader
            .read_event()
            .map_err(|e| BuildError::from_stage("prepare", e))?
        {
            XmlEvent::End(e)
                if e.name().as_ref() == b"cocoon:plugin" || e.name().as_ref() == b"plugin" =>
            {
                break;
            }
            XmlEvent::Empty(e) | XmlEvent::Start(e)
                if e.name().as_ref() == b"param" || e.name().as_ref() == b"variable" =>
            {
                let name = attr_value(&e, reader, b"name")?;
                let value = attr_value(&e, reader, b"value")?;
                if let (Some(name), Some(value)) = (name, value) {
                    variables.insert(name, value);
                }
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

fn write_engine_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    spec: Option<&str>,
) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new("engine");
    start.push_attribute(("name", name));
    start.push_attribute(("spec", spec.unwrap_or("*")));
    writer.write_event(XmlEvent::Empty(start))
}

fn write_plugin_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    spec: &str,
    variables: &HashMap<String, String>,
) -> Result<(), quick_xml::Error> {
    if variables.is_empty() {
        let mut start = BytesStart::new("plugin");
        start.push_attribute(("name", name));
        start.push_attribute(("spec", spec));
        return writer.write_event(XmlEvent::Empty(start));
    }

    let mut start = BytesStart::new("plugin");
    start.push_attribute(("name", name));
    start.push_attribute(("spec", spec));
    writer.write_event(XmlEvent::Start(start))?;
    for (key, value) in variables {
        let mut var = BytesStart::new("variable");
        var.push_attribute(("name", key.as_str()));
        var.push_attribute(("value", value.as_str()));
        writer.write_event(XmlEvent::Empty(var))?;
    }
    writer.write_event(XmlEvent::End(quick_xml::events::BytesEnd::new("plugin")))
}

pub async fn run(ctx: &PipelineContext<'_>) -> Result<(), BuildError> {
    let config_xml_path = ctx.workspace.workspace_dir().join("config.xml");
    let original =
        std::fs::read_to_string(&config_xml_path).map_err(|e| BuildError::from_stage("prepare", e))?;
    let (migrated, engines, plugins) = migrate_legacy_elements(&original)?;
    std::fs::write(&config_xml_path, migrated).map_err(|e| BuildError::from_stage("prepare", e))?;

    let cordova_bin = ctx.lib_dir().join("node_modules/.bin/cordova");
    let log_path = ctx.workspace.cordova_log();

    for engine in engines.iter().filter(|e| e.name == ctx.job.platform.as_str()) {
        let version = engine.spec.clone().unwrap_or_else(|| "latest".to_string());
        run_logged(
            &cordova_bin,
            &["platform", "add", &format!("{}@{}", engine.name, version)],
            ctx.workspace.workspace_dir().as_path(),
            &log_path,
            NATIVE_TOOL_TIMEOUT,
            "installing engine",
        )
        .await?;
    }

    for plugin in &plugins {
        let mut args = vec![
            "plugin".to_string(),
            "add".to_string(),
            format!("{}@{}", plugin.name, plugin.spec),
        ];
        for (key, value) in &plugin.variables {
            args.push("--variable".to_string());
            args.push(format!("{key}={value}"));
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        run_logged(
            &cordova_bin,
            &arg_refs,
            ctx.workspace.workspace_dir().as_path(),
            &log_path,
            NATIVE_TOOL_TIMEOUT,
            "installing plugin",
        )
        .await?;
    }

    run_logged(
        &cordova_bin,
        &["prepare", ctx.job.platform.as_str()],
        ctx.workspace.workspace_dir().as_path(),
        &log_path,
        NATIVE_TOOL_TIMEOUT,
        "running cordova prepare",
    )
    .await
}

#[cfg(test)]
#[path = "prepare_tests.rs"]
mod tests;
