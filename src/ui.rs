pub fn render_public() -> String {
    PUBLIC_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{CHART_JS}}", CHART_JS)
}

pub fn render_admin() -> String {
    ADMIN_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{CHART_JS}}", CHART_JS)
}

const STYLE: &str = r#"
    :root {
      --bg-1: #f3f1ec;
      --bg-2: #d9cbb3;
      --ink: #24211d;
      --accent: #b3261e;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #efe6d8 60%, #f7f3ec 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.3rem;
    }

    .subtitle {
      margin: 4px 0 0;
      color: #5f5c57;
    }

    nav a {
      color: var(--accent-2);
      font-weight: 600;
    }

    .card {
      background: white;
      border-radius: 20px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.92rem;
    }

    th, td {
      text-align: left;
      padding: 6px 8px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    form, .filters {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 12px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 4px;
      font-size: 0.85rem;
      color: #6b645d;
    }

    input, select {
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      font: inherit;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
    }

    button.danger {
      background: var(--accent);
    }

    .types {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      margin-bottom: 12px;
    }

    .types label {
      display: flex;
      align-items: center;
      gap: 6px;
    }

    .metrics {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 12px;
    }

    .metric .label {
      display: block;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: #8b857d;
    }

    .metric .value {
      font-size: 1.5rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    svg.chart {
      width: 100%;
      height: 280px;
      display: block;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .watermark {
      fill: rgba(200, 200, 200, 0.25);
      font-size: 30px;
    }

    .status {
      min-height: 1.2em;
      color: #6b645d;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="warn"] {
      color: #a66300;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    .hidden {
      display: none;
    }
"#;

const CHART_JS: &str = r#"
    const COLORS = ['#b3261e', '#2f4858', '#2d7a4b', '#a66300', '#6a4c93', '#1982c4'];

    const escapeHtml = (value) =>
      String(value).replace(/[&<>"']/g, (ch) => ({
        '&': '&amp;',
        '<': '&lt;',
        '>': '&gt;',
        '"': '&quot;',
        "'": '&#39;'
      })[ch]);

    const bucketLabel = (bucket) => (bucket === null ? 'sin semana' : bucket);

    const renderSeriesChart = (svg, series, watermark) => {
      const width = 600;
      const height = 280;
      const paddingX = 48;
      const paddingY = 36;
      const top = 20;

      const buckets = Array.from(
        new Set(series.flatMap((s) => s.points.map((p) => bucketLabel(p.bucket))))
      ).sort();

      if (!buckets.length) {
        svg.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">Sin datos</text>';
        return;
      }

      const values = series.flatMap((s) => s.points.map((p) => p.value));
      let min = Math.min(0, ...values);
      let max = Math.max(0, ...values);
      if (min === max) {
        max += 1;
      }

      const xStep = buckets.length > 1 ? (width - paddingX * 2) / (buckets.length - 1) : 0;
      const x = (label) => paddingX + buckets.indexOf(label) * xStep;
      const y = (value) => height - paddingY - ((value - min) * (height - top - paddingY)) / (max - min);

      let body = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = min + ((max - min) * i) / 4;
        body += `<line class="chart-grid" x1="${paddingX}" y1="${y(value)}" x2="${width - paddingX}" y2="${y(value)}" />`;
        body += `<text class="chart-label" x="${paddingX - 8}" y="${y(value) + 4}" text-anchor="end">${Math.round(value)}</text>`;
      }

      series.forEach((s, index) => {
        const color = COLORS[index % COLORS.length];
        const path = s.points
          .map((p, i) => `${i === 0 ? 'M' : 'L'} ${x(bucketLabel(p.bucket)).toFixed(2)} ${y(p.value).toFixed(2)}`)
          .join(' ');
        body += `<path d="${path}" fill="none" stroke="${color}" stroke-width="3" />`;
        body += s.points
          .map((p) => `<circle cx="${x(bucketLabel(p.bucket))}" cy="${y(p.value)}" r="4" fill="white" stroke="${color}" stroke-width="2" />`)
          .join('');
        body += `<text class="chart-label" x="${width - paddingX}" y="${top + index * 14}" text-anchor="end" fill="${color}">${escapeHtml(s.plan_type)}</text>`;
      });

      const labelEvery = buckets.length > 8 ? 2 : 1;
      body += buckets
        .map((label, i) => (i % labelEvery === 0
          ? `<text class="chart-label" x="${x(label)}" y="${height - paddingY + 18}" text-anchor="middle">${escapeHtml(label.slice(5))}</text>`
          : ''))
        .join('');

      if (watermark) {
        body += `<text class="watermark" x="50%" y="50%" text-anchor="middle" transform="rotate(-20 300 140)">${escapeHtml(watermark)}</text>`;
      }

      svg.setAttribute('viewBox', `0 0 ${width} ${height}`);
      svg.innerHTML = body;
    };

    const setStatus = (el, message, type) => {
      el.textContent = message;
      el.dataset.type = type || '';
    };
"#;

const PUBLIC_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>666 Rolling Hell</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>666 Rolling Hell</h1>
      <p class="subtitle">Historial de producción de planos (vista pública).</p>
      <nav><a href="/admin">Modo administrador</a></nav>
    </header>

    <section class="card">
      <details>
        <summary>Mostrar historial</summary>
        <table>
          <thead>
            <tr><th>Fecha</th><th>Semana</th><th>Periodicidad</th><th>Tipo de Plano</th><th>Planos Hechos</th></tr>
          </thead>
          <tbody id="history"></tbody>
        </table>
      </details>
    </section>

    <section class="card">
      <h2>Producción por tipo de plano</h2>
      <div class="types" id="types"></div>
      <svg class="chart" id="chart" role="img" aria-label="Producción por tipo"></svg>
    </section>

    <section class="card">
      <h2>Total de planos por tipo</h2>
      <table>
        <thead><tr><th>Tipo de Plano</th><th>Planos Hechos</th></tr></thead>
        <tbody id="totals"></tbody>
      </table>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    {{CHART_JS}}

    const statusEl = document.getElementById('status');
    const typesEl = document.getElementById('types');
    const chartEl = document.getElementById('chart');

    const selectedTypes = () =>
      Array.from(typesEl.querySelectorAll('input:checked')).map((input) => input.value);

    const loadSeries = async () => {
      const types = selectedTypes();
      if (!types.length) {
        renderSeriesChart(chartEl, [], '666 Rolling Hell');
        return;
      }
      const params = new URLSearchParams();
      types.forEach((type) => params.append('types', type));
      const res = await fetch(`/api/public/series?${params.toString()}`);
      if (!res.ok) {
        throw new Error('No se pudo cargar la gráfica');
      }
      renderSeriesChart(chartEl, await res.json(), '666 Rolling Hell');
    };

    const loadAll = async () => {
      const [recordsRes, totalsRes] = await Promise.all([
        fetch('/api/public/records'),
        fetch('/api/public/totals')
      ]);
      if (!recordsRes.ok || !totalsRes.ok) {
        throw new Error('No se pudo cargar el historial');
      }
      const records = await recordsRes.json();
      const totals = await totalsRes.json();

      if (!records.length) {
        setStatus(statusEl, 'Aún no hay registros cargados.', 'info');
      }

      document.getElementById('history').innerHTML = records
        .map((r) => `<tr><td>${escapeHtml(r.date)}</td><td>${escapeHtml(r.week_bucket || '')}</td><td>${escapeHtml(r.periodicity)}</td><td>${escapeHtml(r.plan_type)}</td><td>${escapeHtml(r.units_made)}</td></tr>`)
        .join('');
      document.getElementById('totals').innerHTML = totals
        .map((t) => `<tr><td>${escapeHtml(t.plan_type)}</td><td>${escapeHtml(t.units_made)}</td></tr>`)
        .join('');

      const types = Array.from(new Set(records.map((r) => r.plan_type)));
      typesEl.innerHTML = types
        .map((t) => `<label><input type="checkbox" value="${escapeHtml(t)}" checked /> ${escapeHtml(t)}</label>`)
        .join('');
      typesEl.querySelectorAll('input').forEach((input) => {
        input.addEventListener('change', () => loadSeries().catch((err) => setStatus(statusEl, err.message, 'error')));
      });

      await loadSeries();
    };

    loadAll().catch((err) => setStatus(statusEl, err.message, 'error'));
  </script>
</body>
</html>
"#;

const ADMIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>666 Rolling Hell · Admin</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>666 Rolling Hell</h1>
      <p class="subtitle">Administra la producción de planos.</p>
      <nav><a href="/">Vista pública</a></nav>
    </header>

    <section class="card" id="login-card">
      <h2>Iniciar sesión de administrador</h2>
      <form id="login-form">
        <label>Contraseña <input type="password" id="password" autocomplete="current-password" /></label>
        <button type="submit">Entrar</button>
      </form>
    </section>

    <div id="admin" class="hidden">
      <section class="card">
        <h2>Registrar nueva producción</h2>
        <form id="record-form">
          <label>Periodicidad
            <select id="periodicity">
              <option value="Diaria">Diaria</option>
              <option value="Semanal">Semanal</option>
            </select>
          </label>
          <label>Tipo de plano
            <select id="plan-type">
              <option value="Arquitectonico">Arquitectonico</option>
              <option value="Robo">Robo</option>
              <option value="Otro">Otro</option>
            </select>
          </label>
          <label>Planos hechos <input type="number" id="units" min="0" step="1" value="0" /></label>
          <label>Precio por plano ($) <input type="number" id="price" min="0" step="100" value="0" /></label>
          <label>Costo por plano ($) <input type="number" id="cost" min="0" step="100" value="0" /></label>
          <button type="submit">Guardar registro</button>
        </form>
      </section>

      <section class="card">
        <h2>Registros</h2>
        <div class="filters">
          <label>Desde <input type="date" id="from" /></label>
          <label>Hasta <input type="date" id="to" /></label>
          <button type="button" id="apply-filter">Filtrar</button>
          <button type="button" class="danger" id="delete">Borrar seleccionados</button>
        </div>
        <table>
          <thead>
            <tr><th></th><th>Fecha</th><th>Semana</th><th>Periodicidad</th><th>Tipo</th><th>Planos</th><th>Precio</th><th>Costo Total</th><th>Ganancia Neta</th></tr>
          </thead>
          <tbody id="records"></tbody>
        </table>
      </section>

      <section class="card">
        <h2>Métricas</h2>
        <div class="metrics">
          <div class="metric"><span class="label">Registros</span><span class="value" id="m-count">0</span></div>
          <div class="metric"><span class="label">Planos</span><span class="value" id="m-units">0</span></div>
          <div class="metric"><span class="label">Ingresos</span><span class="value" id="m-revenue">0</span></div>
          <div class="metric"><span class="label">Costo</span><span class="value" id="m-cost">0</span></div>
          <div class="metric"><span class="label">Ganancia</span><span class="value" id="m-profit">0</span></div>
        </div>
        <svg class="chart" id="profit-chart" role="img" aria-label="Ganancia por tipo"></svg>
      </section>
    </div>

    <div class="status" id="status"></div>
  </main>

  <script>
    {{CHART_JS}}

    const statusEl = document.getElementById('status');
    const loginCard = document.getElementById('login-card');
    const adminEl = document.getElementById('admin');

    const rangeQuery = () => {
      const params = new URLSearchParams();
      const from = document.getElementById('from').value;
      const to = document.getElementById('to').value;
      if (from) params.set('from', from);
      if (to) params.set('to', to);
      const query = params.toString();
      return query ? `?${query}` : '';
    };

    const request = async (url, options) => {
      const res = await fetch(url, options);
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const postJson = (url, body) =>
      request(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      });

    const money = (value) => Math.round(value * 100) / 100;

    const refresh = async () => {
      const query = rangeQuery();
      const [records, report] = await Promise.all([
        request(`/api/admin/records${query}`),
        request(`/api/admin/metrics${query}`)
      ]);

      document.getElementById('records').innerHTML = records
        .map((r) => `<tr><td><input type="checkbox" value="${escapeHtml(r.index)}" /></td><td>${escapeHtml(r.date)}</td><td>${escapeHtml(r.week_bucket || '')}</td><td>${escapeHtml(r.periodicity)}</td><td>${escapeHtml(r.plan_type)}</td><td>${escapeHtml(r.units_made)}</td><td>${escapeHtml(r.unit_price)}</td><td>${escapeHtml(money(r.total_cost))}</td><td>${escapeHtml(money(r.net_profit))}</td></tr>`)
        .join('');

      const m = report.metrics;
      document.getElementById('m-count').textContent = m.record_count;
      document.getElementById('m-units').textContent = m.total_units;
      document.getElementById('m-revenue').textContent = money(m.total_revenue);
      document.getElementById('m-cost').textContent = money(m.total_cost);
      document.getElementById('m-profit').textContent = money(m.net_profit);
      renderSeriesChart(document.getElementById('profit-chart'), report.profit_series, '666 Rolling Hell');
    };

    const enterAdmin = async () => {
      loginCard.classList.add('hidden');
      adminEl.classList.remove('hidden');
      await refresh();
    };

    document.getElementById('login-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      try {
        await postJson('/api/login', { password: document.getElementById('password').value });
        setStatus(statusEl, 'Acceso concedido', 'ok');
        await enterAdmin();
      } catch (err) {
        setStatus(statusEl, 'Contraseña incorrecta', 'error');
      }
    });

    document.getElementById('record-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const units = Number(document.getElementById('units').value);
      if (units <= 0) {
        setStatus(statusEl, 'Debe ingresar al menos 1 plano.', 'warn');
        return;
      }
      try {
        const created = await postJson('/api/admin/records', {
          periodicity: document.getElementById('periodicity').value,
          plan_type: document.getElementById('plan-type').value,
          units_made: units,
          unit_price: Number(document.getElementById('price').value),
          unit_cost: Number(document.getElementById('cost').value)
        });
        if (created.warnings.length) {
          setStatus(statusEl, `Registro guardado. Advertencia: ${created.warnings.join(', ')}`, 'warn');
        } else {
          setStatus(statusEl, `Registro guardado para ${created.record.plan_type} (${created.record.units_made} planos).`, 'ok');
        }
        await refresh();
      } catch (err) {
        setStatus(statusEl, err.message, 'error');
      }
    });

    document.getElementById('apply-filter').addEventListener('click', () => {
      refresh().catch((err) => setStatus(statusEl, err.message, 'error'));
    });

    document.getElementById('delete').addEventListener('click', async () => {
      const indices = Array.from(document.querySelectorAll('#records input:checked')).map((input) => Number(input.value));
      if (!indices.length) {
        setStatus(statusEl, 'No hay registros seleccionados.', 'warn');
        return;
      }
      try {
        const result = await postJson('/api/admin/records/delete', { indices });
        setStatus(statusEl, `${result.removed} registros borrados.`, 'ok');
        await refresh();
      } catch (err) {
        setStatus(statusEl, err.message, 'error');
      }
    });

    request('/api/session')
      .then((session) => (session.authenticated ? enterAdmin() : null))
      .catch((err) => setStatus(statusEl, err.message, 'error'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_have_no_unfilled_placeholders() {
        for page in [render_public(), render_admin()] {
            assert!(!page.contains("{{"));
            assert!(page.contains("renderSeriesChart"));
        }
    }

    #[test]
    fn plan_type_labels_are_escaped_before_insertion() {
        for page in [render_public(), render_admin()] {
            assert!(page.contains("const escapeHtml"));
            for raw in ["${r.plan_type}", "${t.plan_type}", "${s.plan_type}", "${t}<", " ${t}"] {
                assert!(!page.contains(raw), "unescaped {raw}");
            }
        }
        assert!(render_public().contains("params.append('types', type)"));
    }
}
