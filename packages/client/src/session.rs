//! Chat session over one TCP connection.

use futures_util::{SinkExt, StreamExt};
use palaver_shared::time::now_millis;
use tokio::{
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use crate::{
    error::ClientError,
    formatter::MessageFormatter,
    ui::{is_quit_command, redisplay_prompt},
};

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed `/quit` or closed the terminal input
    Quit,
    /// The server closed the connection
    ServerClosed,
}

/// A connected, named chat session
pub struct ClientSession {
    addr: String,
    name: String,
    reader: FramedRead<OwnedReadHalf, LinesCodec>,
    writer: FramedWrite<OwnedWriteHalf, LinesCodec>,
}

impl ClientSession {
    /// Connect to `addr` and announce `name` as the first line.
    pub async fn connect(addr: &str, name: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        let (read_half, write_half) = stream.into_split();

        let mut session = Self {
            addr: addr.to_string(),
            name: name.to_string(),
            reader: FramedRead::new(read_half, LinesCodec::new()),
            writer: FramedWrite::new(write_half, LinesCodec::new()),
        };
        session.send(name).await?;
        tracing::info!("Connected to {} as '{}'", addr, name);
        Ok(session)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send one chat line
    pub async fn send(&mut self, line: &str) -> Result<(), ClientError> {
        self.writer.send(line).await?;
        Ok(())
    }

    /// Next line from the server, `None` once the server closed the connection
    pub async fn recv(&mut self) -> Result<Option<String>, ClientError> {
        Ok(self.reader.next().await.transpose()?)
    }

    /// Print incoming lines and forward typed lines until either side ends.
    ///
    /// # Arguments
    ///
    /// * `input` - Typed lines; closing the channel ends the session like `/quit`
    pub async fn run(
        mut self,
        input: &mut mpsc::UnboundedReceiver<String>,
    ) -> Result<SessionEnd, ClientError> {
        print!("{}", MessageFormatter::format_connected(&self.addr, &self.name));
        redisplay_prompt(&self.name);

        loop {
            tokio::select! {
                incoming = self.reader.next() => match incoming {
                    Some(Ok(line)) => {
                        print!("{}", MessageFormatter::format_received(&line, now_millis()));
                        redisplay_prompt(&self.name);
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        print!("{}", MessageFormatter::format_disconnected(&self.addr));
                        return Ok(SessionEnd::ServerClosed);
                    }
                },
                typed = input.recv() => match typed {
                    Some(line) if is_quit_command(&line) => return Ok(SessionEnd::Quit),
                    Some(line) => self.send(&line).await?,
                    None => return Ok(SessionEnd::Quit),
                },
            }
        }
    }
}
