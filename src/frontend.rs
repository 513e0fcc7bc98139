//! Embedded HTML/CSS/JS frontend for the IoT dashboard.
//!
//! The whole single-page UI is compiled into the binary as a string constant
//! and talks to the JSON routes under `/api`.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>IoT Dashboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 16px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 22px; font-weight: 600; }
.mode {
  font-family: var(--mono);
  font-size: 12px;
  padding: 2px 10px;
  border-radius: 12px;
  border: 1px solid var(--border);
  color: var(--text-muted);
}
.mode.mock { color: var(--yellow); border-color: var(--yellow); }

nav { display: flex; gap: 8px; margin-bottom: 20px; }
nav button {
  background: none;
  border: 1px solid var(--border);
  color: var(--text-muted);
  padding: 6px 14px;
  border-radius: var(--radius);
  cursor: pointer;
  font: inherit;
}
nav button.active { color: var(--text); border-color: var(--accent); }

.tab { display: none; }
.tab.active { display: block; }

.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 16px; }
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
}
.card h2 { font-size: 16px; margin-bottom: 8px; text-transform: capitalize; }
.card dl { display: grid; grid-template-columns: auto 1fr; gap: 2px 12px; margin-bottom: 12px; }
.card dt { color: var(--text-muted); }
.card dd { font-family: var(--mono); }
.state-RUNNING { color: var(--green); }
.state-STOPPED { color: var(--red); }
.state-UNKNOWN { color: var(--text-muted); }

form { display: grid; gap: 8px; margin-top: 12px; }
label { display: grid; gap: 2px; color: var(--text-muted); font-size: 12px; }
input, select, textarea {
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 4px;
  padding: 6px 8px;
  font: inherit;
}
textarea { font-family: var(--mono); min-height: 64px; }
button.action {
  background: var(--accent);
  color: var(--bg);
  border: none;
  border-radius: 4px;
  padding: 6px 12px;
  cursor: pointer;
  font-weight: 600;
}
button.action:disabled { opacity: 0.5; cursor: wait; }

.banner {
  padding: 8px 12px;
  border-radius: 4px;
  margin-bottom: 12px;
  border: 1px solid;
  font-size: 13px;
}
.banner.error { color: var(--red); border-color: var(--red); }
.banner.warning { color: var(--yellow); border-color: var(--yellow); }
.banner.success { color: var(--green); border-color: var(--green); }

.toolbar { display: flex; gap: 16px; align-items: end; margin-bottom: 16px; flex-wrap: wrap; }
.summary { display: flex; gap: 12px; margin-bottom: 16px; flex-wrap: wrap; }
.summary .card { min-width: 120px; padding: 10px 14px; }
.summary .value { font-size: 22px; font-weight: 600; }
.summary .label { color: var(--text-muted); font-size: 12px; }

table { width: 100%; border-collapse: collapse; font-size: 13px; }
th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-weight: 500; }
tr.red { background: rgba(248, 81, 73, 0.18); }
tr.yellow { background: rgba(210, 153, 34, 0.18); }
tr.green { background: rgba(63, 185, 80, 0.14); }

footer { margin-top: 16px; color: var(--text-muted); font-size: 12px; }
svg.trend { width: 100%; height: 200px; background: var(--surface); border-radius: var(--radius); margin-bottom: 16px; }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>IoT Dashboard</h1>
    <span id="mode" class="mode">...</span>
  </header>

  <nav>
    <button data-tab="control" class="active">API Control</button>
    <button data-tab="alerts">Alerts Monitor</button>
    <button data-tab="analytics">Analytics Trend</button>
  </nav>

  <section id="tab-control" class="tab active">
    <div id="control-banner"></div>
    <div id="services" class="grid"></div>
  </section>

  <section id="tab-alerts" class="tab">
    <div class="toolbar">
      <label>Refresh every <span id="refresh-value"></span>s
        <input id="refresh" type="range" min="1" max="60" value="5">
      </label>
      <label>Show last
        <input id="limit" type="number" min="1" max="1000" value="20">
      </label>
      <label><span>Auto-refresh</span>
        <input id="auto" type="checkbox" checked>
      </label>
      <button id="alerts-now" class="action">Refresh Now</button>
    </div>
    <div id="alerts-banner"></div>
    <div id="summary" class="summary"></div>
    <table>
      <thead><tr><th>Time</th><th>Severity</th><th>Device</th><th>Rule</th><th>Message</th><th>Value</th><th>Threshold</th></tr></thead>
      <tbody id="alert-rows"></tbody>
    </table>
    <footer id="alerts-footer"></footer>
  </section>

  <section id="tab-analytics" class="tab">
    <div class="toolbar">
      <label>Refresh every <span id="analytics-refresh-value"></span>s
        <input id="analytics-refresh" type="range" min="1" max="60" value="5">
      </label>
      <label>Show last
        <input id="analytics-limit" type="number" min="1" max="1000" value="100">
      </label>
      <label><span>Auto-refresh</span>
        <input id="analytics-auto" type="checkbox" checked>
      </label>
      <button id="analytics-now" class="action">Refresh Now</button>
    </div>
    <div id="analytics-banner"></div>
    <div id="latest" class="summary"></div>
    <svg id="trend" class="trend" viewBox="0 0 1000 200" preserveAspectRatio="none"></svg>
    <footer id="analytics-footer"></footer>
  </section>
</div>

<script>
const METHODS = ['Sequential', 'Flowable', 'Observable', 'CustomCollector', 'ParallelStream'];
let settings = null;
let activeTab = 'control';
let alertsTimer = null;
let alertsInFlight = false;
let analyticsTimer = null;
let analyticsInFlight = false;

function esc(value) {
  return String(value ?? '').replace(/[&<>"']/g, c => ({'&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'}[c]));
}

function banner(b) {
  return b ? `<div class="banner ${esc(b.level)}"><strong>${esc(b.kind)}</strong> ${esc(b.message)}</div>` : '';
}

function when(ts) {
  return ts ? new Date(ts).toLocaleString() : '';
}

async function api(path, options) {
  const response = await fetch(path, options);
  const body = await response.json().catch(() => ({}));
  if (!response.ok) {
    throw new Error(body.error || `HTTP ${response.status}`);
  }
  return body;
}

// API control

function serviceForm(view) {
  const s = view.status || {};
  switch (view.service) {
    case 'simulator':
      return `<label>Device count<input name="deviceCount" type="number" min="1" max="10000" value="${esc(s.deviceCount ?? 10)}"></label>
              <label>Messages per second<input name="rate" type="number" min="1" max="1000" value="${esc(s.rate ?? 5)}"></label>`;
    case 'analytics':
      return `<label>Processing method<select name="method">${METHODS.map(m =>
                `<option ${m === s.method ? 'selected' : ''}>${m}</option>`).join('')}</select></label>
              <label>Batch size<input name="batchSize" type="number" min="1" max="100000" value="${esc(s.batchSize ?? 100)}"></label>`;
    default:
      return `<label>Configuration (JSON object)<textarea name="raw">{}</textarea></label>`;
  }
}

function formPayload(service, form) {
  const data = new FormData(form);
  if (service === 'simulator') {
    return {deviceCount: Number(data.get('deviceCount')), rate: Number(data.get('rate'))};
  }
  if (service === 'analytics') {
    return {method: data.get('method'), batchSize: Number(data.get('batchSize'))};
  }
  return JSON.parse(data.get('raw') || '{}');
}

function renderService(view) {
  const s = view.status;
  const state = s ? s.state : 'UNKNOWN';
  const fields = s ? Object.entries(s).filter(([k]) => k !== 'state' && k !== 'warnings') : [];
  return `<div class="card" id="card-${view.service}">
    <h2>${esc(view.service)}</h2>
    ${banner(view.banner)}
    <dl>
      <dt>State</dt><dd class="state-${esc(state)}">${esc(state)}</dd>
      ${fields.map(([k, v]) => `<dt>${esc(k)}</dt><dd>${esc(v)}</dd>`).join('')}
      <dt>Updated</dt><dd>${esc(when(view.updatedAt)) || 'never'}</dd>
    </dl>
    <button class="action" data-toggle="${view.service}">${esc(view.toggleLabel)}</button>
    <form data-service="${view.service}">
      ${serviceForm(view)}
      <button class="action" type="submit">Apply configuration</button>
    </form>
  </div>`;
}

function replaceService(view) {
  const card = document.getElementById(`card-${view.service}`);
  if (card) {
    card.outerHTML = renderService(view);
  }
}

async function loadControl() {
  try {
    const overview = await api('/api/control');
    document.getElementById('control-banner').innerHTML = '';
    document.getElementById('services').innerHTML = overview.services.map(renderService).join('');
  } catch (e) {
    document.getElementById('control-banner').innerHTML = banner({level: 'error', kind: 'request', message: e.message});
  }
}

document.getElementById('services').addEventListener('click', async event => {
  const service = event.target.dataset.toggle;
  if (!service) return;
  event.target.disabled = true;
  try {
    replaceService(await api(`/api/control/${service}/toggle`, {method: 'POST'}));
  } catch (e) {
    document.getElementById('control-banner').innerHTML = banner({level: 'error', kind: 'request', message: e.message});
    event.target.disabled = false;
  }
});

document.getElementById('services').addEventListener('submit', async event => {
  event.preventDefault();
  const form = event.target;
  const service = form.dataset.service;
  let payload;
  try {
    payload = formPayload(service, form);
  } catch (e) {
    document.getElementById('control-banner').innerHTML = banner({level: 'error', kind: 'validation', message: e.message});
    return;
  }
  form.querySelector('button').disabled = true;
  try {
    replaceService(await api(`/api/control/${service}/config`, {
      method: 'POST',
      headers: {'Content-Type': 'application/json'},
      body: JSON.stringify(payload),
    }));
  } catch (e) {
    document.getElementById('control-banner').innerHTML = banner({level: 'error', kind: 'request', message: e.message});
    form.querySelector('button').disabled = false;
  }
});

// Alerts monitor

function summaryCard(value, label) {
  return `<div class="card"><div class="value">${esc(value)}</div><div class="label">${esc(label)}</div></div>`;
}

function renderAlerts(view) {
  document.getElementById('alerts-banner').innerHTML = banner(view.banner);
  const s = view.summary;
  document.getElementById('summary').innerHTML =
    summaryCard(s.total, 'Total') + summaryCard(s.critical, 'Critical') + summaryCard(s.warning, 'Warning') +
    summaryCard(s.info, 'Info') + summaryCard(s.devices, 'Devices') + summaryCard(s.rules, 'Rules');
  document.getElementById('alert-rows').innerHTML = view.rows.map(r => `<tr class="${esc(r.color)}">
      <td>${esc(when(r.timestamp))}</td><td>${esc(r.severity)}</td><td>${esc(r.deviceId)}</td>
      <td>${esc(r.ruleId)}</td><td>${esc(r.message)}</td><td>${esc(r.value)}</td><td>${esc(r.threshold)}</td>
    </tr>`).join('');
  document.getElementById('alerts-footer').textContent =
    `Source: ${view.source} | Last refresh: ${when(view.refreshedAt) || 'never'} | Auto-refresh every ${view.refreshSeconds}s`;
}

function refreshSeconds() {
  return Number(document.getElementById('refresh').value);
}

async function alertsTick() {
  alertsTimer = null;
  if (alertsInFlight) return;
  alertsInFlight = true;
  try {
    const limit = Number(document.getElementById('limit').value);
    renderAlerts(await api(`/api/alerts?limit=${limit}&refresh=${refreshSeconds()}`));
  } catch (e) {
    document.getElementById('alerts-banner').innerHTML = banner({level: 'error', kind: 'request', message: e.message});
  } finally {
    alertsInFlight = false;
    scheduleAlerts();
  }
}

// The next tick is only scheduled once the previous one finished
function scheduleAlerts() {
  clearTimeout(alertsTimer);
  alertsTimer = null;
  if (activeTab === 'alerts' && document.getElementById('auto').checked && !alertsInFlight) {
    alertsTimer = setTimeout(alertsTick, refreshSeconds() * 1000);
  }
}

document.getElementById('refresh').addEventListener('input', event => {
  document.getElementById('refresh-value').textContent = event.target.value;
  scheduleAlerts();
});
document.getElementById('auto').addEventListener('change', scheduleAlerts);
document.getElementById('limit').addEventListener('change', () => { if (!alertsInFlight) alertsTick(); });
document.getElementById('alerts-now').addEventListener('click', () => { if (!alertsInFlight) alertsTick(); });

// Analytics trend

function polyline(points, key, max, color) {
  if (points.length < 2) return '';
  const step = 1000 / (points.length - 1);
  const coords = points.map((p, i) => `${(i * step).toFixed(1)},${(200 - (p[key] / max) * 190).toFixed(1)}`).join(' ');
  return `<polyline fill="none" stroke="${color}" stroke-width="2" points="${coords}"/>`;
}

function analyticsRefreshSeconds() {
  return Number(document.getElementById('analytics-refresh').value);
}

function renderAnalytics(view) {
  document.getElementById('analytics-banner').innerHTML = banner(view.banner);
  const latest = view.latest;
  document.getElementById('latest').innerHTML = latest
    ? summaryCard(latest.totalDevices, 'Devices') + summaryCard(latest.onlineDevices, 'Online') +
      summaryCard(`${view.availability ?? '-'}%`, 'Availability') +
      summaryCard(latest.batteryAvg, 'Battery avg') + summaryCard(latest.signalAvg, 'Signal avg')
    : '';
  const maxDevices = Math.max(1, ...view.points.map(p => p.totalDevices));
  document.getElementById('trend').innerHTML =
    polyline(view.points, 'onlineDevices', maxDevices, 'var(--accent)') +
    polyline(view.points, 'batteryAvg', 100, 'var(--green)') +
    polyline(view.points, 'signalAvg', 100, 'var(--yellow)');
  document.getElementById('analytics-footer').textContent =
    `Source: ${view.source} | ${view.points.length} points | Last refresh: ${when(view.refreshedAt) || 'never'} | Auto-refresh every ${view.refreshSeconds}s`;
}

async function analyticsTick() {
  analyticsTimer = null;
  if (analyticsInFlight) return;
  analyticsInFlight = true;
  try {
    const limit = Number(document.getElementById('analytics-limit').value);
    renderAnalytics(await api(`/api/analytics/history?limit=${limit}&refresh=${analyticsRefreshSeconds()}`));
  } catch (e) {
    document.getElementById('analytics-banner').innerHTML = banner({level: 'error', kind: 'request', message: e.message});
  } finally {
    analyticsInFlight = false;
    scheduleAnalytics();
  }
}

function scheduleAnalytics() {
  clearTimeout(analyticsTimer);
  analyticsTimer = null;
  if (activeTab === 'analytics' && document.getElementById('analytics-auto').checked && !analyticsInFlight) {
    analyticsTimer = setTimeout(analyticsTick, analyticsRefreshSeconds() * 1000);
  }
}

document.getElementById('analytics-refresh').addEventListener('input', event => {
  document.getElementById('analytics-refresh-value').textContent = event.target.value;
  scheduleAnalytics();
});
document.getElementById('analytics-auto').addEventListener('change', scheduleAnalytics);
document.getElementById('analytics-limit').addEventListener('change', () => { if (!analyticsInFlight) analyticsTick(); });
document.getElementById('analytics-now').addEventListener('click', () => { if (!analyticsInFlight) analyticsTick(); });

// Tabs

function showTab(name) {
  activeTab = name;
  document.querySelectorAll('nav button').forEach(b => b.classList.toggle('active', b.dataset.tab === name));
  document.querySelectorAll('.tab').forEach(t => t.classList.toggle('active', t.id === `tab-${name}`));
  if (name === 'control') loadControl();
  if (name === 'alerts' && !alertsInFlight) alertsTick();
  if (name === 'analytics' && !analyticsInFlight) analyticsTick();
  scheduleAlerts();
  scheduleAnalytics();
}

document.querySelectorAll('nav button').forEach(b => b.addEventListener('click', () => showTab(b.dataset.tab)));

async function init() {
  try {
    settings = await api('/api/settings');
    const mode = document.getElementById('mode');
    mode.textContent = settings.mockMode ? 'MOCK MODE' : 'LIVE';
    mode.classList.toggle('mock', settings.mockMode);
    const [minRefresh, maxRefresh] = settings.refreshSecondsRange;
    const refresh = document.getElementById('refresh');
    refresh.min = minRefresh;
    refresh.max = maxRefresh;
    refresh.value = settings.refreshSecondsDefault;
    const analyticsRefresh = document.getElementById('analytics-refresh');
    analyticsRefresh.min = minRefresh;
    analyticsRefresh.max = maxRefresh;
    analyticsRefresh.value = settings.refreshSecondsDefault;
    const [minLimit, maxLimit] = settings.limitRange;
    const limit = document.getElementById('limit');
    limit.min = minLimit;
    limit.max = maxLimit;
    limit.value = settings.alertsLimitDefault;
    const analyticsLimit = document.getElementById('analytics-limit');
    analyticsLimit.min = minLimit;
    analyticsLimit.max = maxLimit;
    analyticsLimit.value = settings.analyticsLimitDefault;
  } catch (e) {
    document.getElementById('control-banner').innerHTML = banner({level: 'error', kind: 'request', message: e.message});
  }
  document.getElementById('refresh-value').textContent = refreshSeconds();
  document.getElementById('analytics-refresh-value').textContent = analyticsRefreshSeconds();
  loadControl();
}

init();
</script>
</body>
</html>
"##;
