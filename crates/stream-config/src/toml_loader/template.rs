//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Stream host configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[content]
# base_url = "http://localhost:8082/apps/"   # must end with '/'
# widget_page = "StreamWidget.html"
# asset_dir = "/path/to/widget"              # serve via stream://localhost/ instead
# default_flow_path = "/path/to/flow.json"   # replaces the built-in default flow

[viewport]
# initial_width = 600
# initial_height = 400

[lifecycle]
# detach_timeout_ms = 1000    # 1-60000

[webview]
# devtools = false
# transparent = false
# user_agent = "StreamHost/0.1"

[logging]
# level = "info"             # trace, debug, info, warn, error
"##
    .to_string()
}
