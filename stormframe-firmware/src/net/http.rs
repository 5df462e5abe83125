//! reqwless-backed transport

use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Read;
use esp_hal::rng::Rng;
use reqwless::client::{HttpClient as ReqwlessHttp, TlsConfig, TlsVerify};
use reqwless::headers::ContentType;
use reqwless::request::{Method as ReqwlessMethod, RequestBuilder};
use reqwless::response::Response;
use static_cell::StaticCell;

use stormframe_core::slots::DownloadBuffer;
use stormframe_core::traits::{HttpClient, Method, Request, TransportError};

/// TLS record buffers; 16 KiB is the largest record a server may send
pub const TLS_READ_BUF_SIZE: usize = 16 * 1024 + 512;
pub const TLS_WRITE_BUF_SIZE: usize = 4 * 1024;
/// Status line and headers
const HEADER_BUF_SIZE: usize = 2 * 1024;
/// Body is copied into the download buffer in chunks of this size
const CHUNK_SIZE: usize = 1024;

type Tcp = TcpClient<'static, 1, 1024, 1024>;

static TCP_STATE: StaticCell<TcpClientState<1, 1024, 1024>> = StaticCell::new();
static TCP: StaticCell<Tcp> = StaticCell::new();
static DNS: StaticCell<DnsSocket<'static>> = StaticCell::new();
static TLS_READ: StaticCell<[u8; TLS_READ_BUF_SIZE]> = StaticCell::new();
static TLS_WRITE: StaticCell<[u8; TLS_WRITE_BUF_SIZE]> = StaticCell::new();
static HEADERS: StaticCell<[u8; HEADER_BUF_SIZE]> = StaticCell::new();

/// One request at a time over a single TCP socket
pub struct ReqwlessTransport {
    tcp: &'static Tcp,
    dns: &'static DnsSocket<'static>,
    tls_read: &'static mut [u8],
    tls_write: &'static mut [u8],
    headers: &'static mut [u8],
    rng: Rng,
}

impl ReqwlessTransport {
    /// Claims the static socket state; call once
    pub fn new(stack: Stack<'static>, rng: Rng) -> Self {
        let state = TCP_STATE.init(TcpClientState::new());
        Self {
            tcp: TCP.init(TcpClient::new(stack, state)),
            dns: DNS.init(DnsSocket::new(stack)),
            tls_read: TLS_READ.init([0; TLS_READ_BUF_SIZE]),
            tls_write: TLS_WRITE.init([0; TLS_WRITE_BUF_SIZE]),
            headers: HEADERS.init([0; HEADER_BUF_SIZE]),
            rng,
        }
    }

    async fn exchange(
        &mut self,
        request: &Request<'_>,
        sink: &mut DownloadBuffer,
    ) -> Result<u16, TransportError> {
        let Self {
            tcp,
            dns,
            tls_read,
            tls_write,
            headers,
            rng,
        } = self;

        let seed = (rng.random() as u64) << 32 | rng.random() as u64;
        let tls = TlsConfig::new(seed, tls_read, tls_write, TlsVerify::None);
        let mut client = ReqwlessHttp::new_with_tls(*tcp, *dns, tls);

        let method = match request.method {
            Method::Get => ReqwlessMethod::GET,
            Method::Post => ReqwlessMethod::POST,
        };
        let handle = client.request(method, request.url).await.map_err(map_error)?;

        match request.json_body {
            Some(body) => {
                let mut handle = handle.body(body).content_type(ContentType::ApplicationJson);
                let response = handle.send(headers).await.map_err(map_error)?;
                drain(response, sink).await
            }
            None => {
                let mut handle = handle;
                let response = handle.send(headers).await.map_err(map_error)?;
                drain(response, sink).await
            }
        }
    }
}

impl HttpClient for ReqwlessTransport {
    async fn fetch(
        &mut self,
        request: &Request<'_>,
        sink: &mut DownloadBuffer,
    ) -> Result<u16, TransportError> {
        let timeout = Duration::from_millis(request.timeout_ms.into());
        match with_timeout(timeout, self.exchange(request, sink)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        }
    }
}

/// Stream a 200 body into `sink`; other statuses are returned unread
async fn drain<C: Read>(
    response: Response<'_, '_, C>,
    sink: &mut DownloadBuffer,
) -> Result<u16, TransportError> {
    let status = response.status.0;
    if status != 200 {
        return Ok(status);
    }

    if let Some(length) = response.content_length {
        sink.reserve_hint(length)?;
    }

    let mut reader = response.body().reader();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut chunk).await.map_err(map_error)?;
        if n == 0 {
            break;
        }
        sink.append(&chunk[..n])?;
    }
    Ok(status)
}

fn map_error(e: reqwless::Error) -> TransportError {
    match e {
        reqwless::Error::Dns => TransportError::Dns,
        reqwless::Error::InvalidUrl(_) => TransportError::InvalidUrl,
        reqwless::Error::Network(_) | reqwless::Error::ConnectionAborted => {
            TransportError::Connect
        }
        reqwless::Error::Tls(_) => TransportError::Connect,
        _ => TransportError::Protocol,
    }
}
