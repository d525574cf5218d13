//! Shared test fixtures
//!
//! [`MockSwitch`] is a minimal event socket server: it greets with `auth/request`, checks
//! the password and answers every later command through a responder function. Every
//! command received after authentication is recorded in arrival order.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use freeswitch_exporter::target::{Address, Target};
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

pub const PASSWORD: &str = "ClueCon";

pub type Responder = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct MockSwitch {
    pub addr: SocketAddr,
    commands: Arc<Mutex<Vec<String>>>,
}

impl MockSwitch {
    /// Starts a server that accepts [`PASSWORD`] and answers through `responder`.
    ///
    /// Commands the responder does not know get the switch's `-ERR ... Command not found!`
    /// reply.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock switch");
        let addr = listener.local_addr().expect("Mock switch has no address");
        let commands = Arc::new(Mutex::new(Vec::new()));
        let responder: Responder = Arc::new(responder);

        let recorded = commands.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, responder.clone(), recorded.clone()));
            }
        });

        Self { addr, commands }
    }

    /// Commands received after authentication, in order
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("commands lock poisoned").clone()
    }

    pub fn target(&self) -> Target {
        self.target_with(PASSWORD, Vec::new())
    }

    pub fn target_with(&self, password: &str, disabled: Vec<&str>) -> Target {
        Target::new(
            Address::Tcp(self.addr.to_string()),
            SecretString::from(password),
            Duration::from_secs(2),
            disabled.into_iter().map(String::from),
        )
    }
}

async fn serve(
    stream: tokio::net::TcpStream,
    responder: Responder,
    commands: Arc<Mutex<Vec<String>>>,
) {
    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    if writer
        .write_all(b"Content-Type: auth/request\n\n")
        .await
        .is_err()
    {
        return;
    }

    let Some(auth) = read_command(&mut reader).await else {
        return;
    };
    let reply_text = if auth == format!("auth {}", PASSWORD) {
        "+OK accepted"
    } else {
        "-ERR invalid"
    };
    let reply = format!("Content-Type: command/reply\nReply-Text: {}\n\n", reply_text);
    if writer.write_all(reply.as_bytes()).await.is_err() || reply_text != "+OK accepted" {
        return;
    }

    while let Some(command) = read_command(&mut reader).await {
        commands
            .lock()
            .expect("commands lock poisoned")
            .push(command.clone());

        let body = responder(&command).unwrap_or_else(|| not_found(&command));
        let frame = api_response(&body);
        if writer.write_all(frame.as_bytes()).await.is_err() {
            return;
        }
    }
}

async fn read_command<R>(reader: &mut R) -> Option<String>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).await.ok()?;
        if read == 0 {
            return None;
        }
        let line = line.trim_end_matches(['\r', '\n']).to_string();
        if line.is_empty() {
            if lines.is_empty() {
                continue;
            }
            return Some(lines.join("\n"));
        }
        lines.push(line);
    }
}

/// One `api/response` frame carrying `body`
pub fn api_response(body: &str) -> String {
    format!(
        "Content-Type: api/response\nContent-Length: {}\n\n{}",
        body.len(),
        body
    )
}

pub fn not_found(command: &str) -> String {
    let name = command
        .strip_prefix("api ")
        .unwrap_or(command)
        .split_whitespace()
        .next()
        .unwrap_or_default();
    format!("-ERR {} Command not found!\n", name)
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs() as i64
}

pub const STATUS_REPLY: &str = "UP 0 years, 0 days, 1 hour, 2 minutes, 3 seconds, 4 milliseconds, 5 microseconds
FreeSWITCH (Version 1.10.7 -release 64bit) is ready
12 session(s) since startup
2 session(s) - peak 5, last 5min 3
1 session(s) per Sec out of max 30, peak 4, last 5min 2
1000 session(s) max
min idle cpu 0.00/97.63
Current Stack Size/Max 240K/8192K
";

pub const GATEWAYS_REPLY: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<gateways>
  <gateway>
    <name>carrier-a</name>
    <profile>external</profile>
    <scheme>Digest</scheme>
    <realm>sip.carrier-a.net</realm>
    <proxy>sip:sip.carrier-a.net</proxy>
    <context>public</context>
    <expires>3600</expires>
    <ping>1700000000</ping>
    <pingfreq>30</pingfreq>
    <pingmin>3</pingmin>
    <pingcount>4</pingcount>
    <pingmax>6</pingmax>
    <pingtime>12.50</pingtime>
    <pinging>0</pinging>
    <state>REGED</state>
    <status>UP</status>
    <uptime-usec>123456789</uptime-usec>
    <calls-in>10</calls-in>
    <calls-out>20</calls-out>
    <failed-calls-in>1</failed-calls-in>
    <failed-calls-out>2</failed-calls-out>
  </gateway>
  <gateway>
    <name>carrier-b</name>
    <profile>external</profile>
    <scheme>Digest</scheme>
    <proxy>sip:sip.carrier-b.net</proxy>
    <context>public</context>
    <ping></ping>
    <pingtime></pingtime>
    <state>FAIL_WAIT</state>
    <status>DOWN</status>
  </gateway>
</gateways>
"#;

pub const MEMORY_REPLY: &str = "Total non-mmapped bytes (arena):       1351680
# of free chunks (ordblks):            12
Total allocated space (uordblks):      1014400
Total free space (fordblks):           337280
+OK
";

pub const MODULES_REPLY: &str = r#"<configuration name="modules.conf" description="Modules">
  <modules>
    <load module="mod_sofia"/>
    <load module="mod_verto"/>
  </modules>
</configuration>
"#;

pub const ENDPOINTS_REPLY: &str = r#"<result row_count="2">
  <row row_id="1">
    <type>endpoint</type>
    <name>sofia</name>
    <ikey>mod_sofia</ikey>
  </row>
  <row row_id="2">
    <type>endpoint</type>
    <name>loopback</name>
    <ikey>mod_loopback</ikey>
  </row>
</result>
"#;

pub const CODECS_REPLY: &str = r#"<result row_count="1">
  <row row_id="1">
    <type>codec</type>
    <name>G.711 ulaw</name>
    <ikey>CORE_PCM_MODULE</ikey>
  </row>
</result>
"#;

pub const REGISTRATIONS_REPLY: &str = r#"<result row_count="1">
  <row row_id="1">
    <reg_user>1000</reg_user>
    <realm>pbx.example.com</realm>
    <token>a1b2c3</token>
    <url>sofia/internal/sip:1000@10.0.0.9:5060</url>
    <expires>1700000300</expires>
    <network_ip>10.0.0.9</network_ip>
    <network_port>5060</network_port>
    <network_proto>udp</network_proto>
    <hostname>fs1</hostname>
  </row>
</result>
"#;

pub const VERTO_REPLY: &str = r#"<profiles>
  <profile>
    <name>default-v4</name>
    <type>profile</type>
    <data>0.0.0.0:8081</data>
    <state>RUNNING</state>
  </profile>
  <profile>
    <name>default-v6</name>
    <type>profile</type>
    <data>[::]:8081</data>
    <state>DOWN</state>
  </profile>
</profiles>
"#;

/// Replies of a healthy switch with every module loaded
pub fn healthy_switch(command: &str) -> Option<String> {
    let reply = match command {
        "api show calls count as json" => r#"{"row_count":3}"#,
        "api show detailed_bridged_calls as json" => r#"{"row_count":1,"rows":[]}"#,
        "api show detailed_calls as json" => r#"{"row_count":2}"#,
        "api show bridged_calls as json" => r#"{"row_count":1}"#,
        "api show registrations as json" => r#"{"row_count":1}"#,
        "api show channels count as json" => r#"{"row_count":4}"#,
        "api uptime s" => "3723\n",
        "api strepoch" => return Some(format!("{}\n", unix_now())),
        "api status" => STATUS_REPLY,
        "api sofia xmlstatus gateway" => GATEWAYS_REPLY,
        "api memory" => MEMORY_REPLY,
        "api xml_locate configuration configuration name modules.conf" => MODULES_REPLY,
        "api module_exists mod_sofia" => "true",
        "api module_exists mod_verto" => "false",
        "api show endpoint as xml" => ENDPOINTS_REPLY,
        "api show codec as xml" => CODECS_REPLY,
        "api show registrations as xml" => REGISTRATIONS_REPLY,
        "api verto xmlstatus" => VERTO_REPLY,
        _ => return None,
    };
    Some(reply.to_string())
}
